//! Index structures and the algorithms that combine their posting lists.

pub mod inverted;
pub mod merge;
