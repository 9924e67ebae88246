//! Core data structures of the inverted index.

pub mod analyzed;
pub mod posting;
