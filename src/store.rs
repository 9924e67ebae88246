//! Concurrent storage shared by the document store and the inverted index.

pub mod keyed;

pub use keyed::KeyedStore;
