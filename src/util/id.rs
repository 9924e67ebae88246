//! Document id generation.
//!
//! Sharded ids use the layout:
//!
//! Bits 48-63: Shard ID (16 bits)
//! Bits 0-47:  Local ID (48 bits)

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::data::DocId;
use crate::error::{LumenError, Result};

pub const SHARD_ID_BITS: u32 = 16;
pub const LOCAL_ID_BITS: u32 = 48;
pub const LOCAL_ID_MASK: u64 = (1 << LOCAL_ID_BITS) - 1;
pub const MAX_LOCAL_ID: u64 = LOCAL_ID_MASK;

/// Source of unique document ids.
///
/// Implementations must never return the same id twice for the lifetime of an
/// engine. Exhaustion is reported as [`LumenError::IdExhausted`].
pub trait IdGenerator: Send + Sync + Debug {
    fn next_id(&self) -> Result<DocId>;
}

/// Hands out strictly increasing ids starting at 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Result<DocId> {
        let id = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_add(1))
            .map_err(|_| LumenError::IdExhausted("sequential id counter overflowed".into()))?;
        Ok(DocId::new(id))
    }
}

/// Hands out shard-prefixed ids so that several engines can share one id space.
#[derive(Debug)]
pub struct ShardedIdGenerator {
    shard_id: u16,
    next_local: AtomicU64,
}

impl ShardedIdGenerator {
    pub fn new(shard_id: u16) -> Self {
        Self::starting_at(shard_id, 1)
    }

    pub fn starting_at(shard_id: u16, first_local: u64) -> Self {
        Self {
            shard_id,
            next_local: AtomicU64::new(first_local),
        }
    }

    pub fn shard_id(&self) -> u16 {
        self.shard_id
    }
}

impl IdGenerator for ShardedIdGenerator {
    fn next_id(&self) -> Result<DocId> {
        let local = self
            .next_local
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n <= MAX_LOCAL_ID).then_some(n + 1)
            })
            .map_err(|_| {
                LumenError::IdExhausted(format!(
                    "shard {} has no local ids left",
                    self.shard_id
                ))
            })?;
        Ok(DocId::new(create_doc_id(self.shard_id, local)))
    }
}

/// Create a 64-bit ID from a shard ID and a local ID.
pub fn create_doc_id(shard_id: u16, local_id: u64) -> u64 {
    ((shard_id as u64) << LOCAL_ID_BITS) | (local_id & LOCAL_ID_MASK)
}

/// Extract the shard ID from a 64-bit doc ID.
pub fn get_shard_id(doc_id: u64) -> u16 {
    (doc_id >> LOCAL_ID_BITS) as u16
}

/// Extract the local ID from a 64-bit doc ID.
pub fn get_local_id(doc_id: u64) -> u64 {
    doc_id & LOCAL_ID_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let doc_id = create_doc_id(42, 12345);
        assert_eq!(get_shard_id(doc_id), 42);
        assert_eq!(get_local_id(doc_id), 12345);
    }

    #[test]
    fn test_sequential_ids_increase() {
        let generator = SequentialIdGenerator::new();
        let a = generator.next_id().unwrap();
        let b = generator.next_id().unwrap();
        assert_eq!(a, DocId::new(1));
        assert!(b > a);
    }

    #[test]
    fn test_sequential_overflow_is_reported() {
        let generator = SequentialIdGenerator::starting_at(u64::MAX);
        assert!(matches!(
            generator.next_id(),
            Err(LumenError::IdExhausted(_))
        ));
    }

    #[test]
    fn test_sharded_ids_carry_shard() {
        let generator = ShardedIdGenerator::new(7);
        let id = generator.next_id().unwrap();
        assert_eq!(get_shard_id(id.as_u64()), 7);
        assert_eq!(get_local_id(id.as_u64()), 1);
    }

    #[test]
    fn test_sharded_exhaustion() {
        let generator = ShardedIdGenerator::starting_at(1, MAX_LOCAL_ID);
        let last = generator.next_id().unwrap();
        assert_eq!(get_local_id(last.as_u64()), MAX_LOCAL_ID);
        assert!(matches!(
            generator.next_id(),
            Err(LumenError::IdExhausted(_))
        ));
    }

    #[test]
    fn test_shard_isolation() {
        let a = ShardedIdGenerator::new(1).next_id().unwrap();
        let b = ShardedIdGenerator::new(2).next_id().unwrap();
        assert_ne!(a, b);
    }
}
