use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a stored document.
///
/// Ids are handed out by an [`IdGenerator`](crate::util::id::IdGenerator) at
/// insertion time and never change afterwards. They are totally ordered, which
/// is what search uses to break ranking ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(u64);

impl DocId {
    pub const fn new(raw: u64) -> Self {
        DocId(raw)
    }

    /// The raw value behind this id.
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DocId {
    fn from(raw: u64) -> Self {
        DocId(raw)
    }
}

/// A stored document: its id and the payload it was inserted or updated with.
///
/// The payload is shared with the document store, so handing out records
/// never copies user data.
#[derive(Debug)]
pub struct Record<T> {
    pub id: DocId,
    pub payload: Arc<T>,
}

impl<T> Record<T> {
    pub fn new(id: DocId, payload: Arc<T>) -> Self {
        Self { id, payload }
    }
}

impl<T> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<T: PartialEq> PartialEq for Record<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.payload == other.payload
    }
}
