//! Sharded, thread-safe key-value map.
//!
//! [`KeyedStore`] backs both the document store (`DocId → payload`) and the
//! inverted index (`token → posting list`). Keys are spread over a fixed
//! number of shards, each guarded by a [`parking_lot::RwLock`]. Every
//! operation touching a key holds that key's shard lock for its whole
//! duration, so read-modify-write closures such as [`KeyedStore::upsert_with`]
//! cannot lose updates under concurrent writers.
//!
//! # Locking rules
//!
//! - At most one shard lock is held at any time.
//! - Closures passed to the store run under a shard lock and must not call
//!   back into the same store.
//! - Bulk operations ([`merge`](KeyedStore::merge),
//!   [`intersection`](KeyedStore::intersection), ...) work on snapshots and
//!   are meant for administration, not the hot path.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};

use ahash::RandomState;
use parking_lot::RwLock;

type Shard<K, V> = RwLock<HashMap<K, V, RandomState>>;

/// A thread-safe map from `K` to `V`.
pub struct KeyedStore<K, V> {
    shards: Box<[Shard<K, V>]>,
    hasher: RandomState,
}

impl<K, V> fmt::Debug for KeyedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedStore")
            .field("shards", &self.shards.len())
            .field("len", &self.len())
            .finish()
    }
}

impl<K, V> Default for KeyedStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Default shard count: four shards per CPU, rounded up to a power of two.
pub fn default_shard_count() -> usize {
    (num_cpus::get() * 4).next_power_of_two()
}

impl<K, V> KeyedStore<K, V> {
    /// Number of entries. Takes every shard's read lock in turn, so the value
    /// can be stale by the time it is returned if writers are active.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.read().is_empty())
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.write().clear();
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_shards(default_shard_count())
    }

    /// Create a store with `shards` shards (at least one).
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| RwLock::new(HashMap::with_hasher(RandomState::new())))
            .collect();
        KeyedStore {
            shards,
            hasher: RandomState::new(),
        }
    }

    fn shard<Q>(&self, key: &Q) -> &Shard<K, V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hasher.hash_one(key);
        &self.shards[(hash as usize) % self.shards.len()]
    }

    /// Run `f` against the value for `key` without cloning it.
    pub fn with<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&V) -> R,
    {
        self.shard(key).read().get(key).map(f)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).read().contains_key(key)
    }

    /// Insert or replace, returning the previous value.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.shard(&key).write().insert(key, value)
    }

    /// Remove `key`, returning its value if it was present.
    pub fn delete<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard(key).write().remove(key)
    }

    /// Mutate the value for `key` in place if present.
    pub fn update<Q, R, F>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&mut V) -> R,
    {
        self.shard(key).write().get_mut(key).map(f)
    }

    /// Mutate the value for `key`, creating it with `default` first if absent.
    pub fn upsert_with<D, R, F>(&self, key: K, default: D, f: F) -> R
    where
        D: FnOnce() -> V,
        F: FnOnce(&mut V) -> R,
    {
        let mut shard = self.shard(&key).write();
        f(shard.entry(key).or_insert_with(default))
    }

    /// Mutate the value for `key` if present; drop the entry when `f` returns
    /// `false`. Returns whether the key existed.
    pub fn modify_or_remove<Q, F>(&self, key: &Q, f: F) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnOnce(&mut V) -> bool,
    {
        let mut shard = self.shard(key).write();
        let Some(value) = shard.get_mut(key) else {
            return false;
        };
        if !f(value) {
            shard.remove(key);
        }
        true
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.with(key, V::clone)
    }

    /// Insert `value` only if `key` is absent.
    ///
    /// Returns the value now stored and whether it was already there.
    pub fn get_or_set(&self, key: K, value: V) -> (V, bool) {
        self.get_or_compute(key, || value)
    }

    /// Like [`get_or_set`](Self::get_or_set), computing the value lazily.
    pub fn get_or_compute<F>(&self, key: K, f: F) -> (V, bool)
    where
        F: FnOnce() -> V,
    {
        let mut shard = self.shard(&key).write();
        if let Some(existing) = shard.get(&key) {
            return (existing.clone(), true);
        }
        let value = f();
        shard.insert(key, value.clone());
        (value, false)
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    /// Replace the value for `key` with `new` only if it currently equals `old`.
    pub fn compare_and_swap<Q>(&self, key: &Q, old: &V, new: V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let mut shard = self.shard(key).write();
        match shard.get_mut(key) {
            Some(current) if *current == *old => {
                *current = new;
                true
            }
            _ => false,
        }
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Copy of all entries, taken shard by shard.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        let mut entries = Vec::new();
        for shard in self.shards.iter() {
            let guard = shard.read();
            entries.extend(guard.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        entries
    }

    pub fn keys(&self) -> Vec<K> {
        let mut keys = Vec::new();
        for shard in self.shards.iter() {
            keys.extend(shard.read().keys().cloned());
        }
        keys
    }

    /// Visit a snapshot of the entries; stop early when `f` returns `false`.
    ///
    /// No lock is held while `f` runs, so `f` may call back into the store.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (key, value) in self.snapshot() {
            if !f(&key, &value) {
                break;
            }
        }
    }

    /// Copy every entry of `other` into `self`, replacing values on key clashes.
    pub fn merge(&self, other: &KeyedStore<K, V>) {
        for (key, value) in other.snapshot() {
            self.set(key, value);
        }
    }

    /// New store holding the entries for which `predicate` holds.
    pub fn filter<F>(&self, mut predicate: F) -> KeyedStore<K, V>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let filtered = KeyedStore::with_shards(self.shard_count());
        for (key, value) in self.snapshot() {
            if predicate(&key, &value) {
                filtered.set(key, value);
            }
        }
        filtered
    }

    /// True when no key is present in both stores.
    pub fn is_disjoint(&self, other: &KeyedStore<K, V>) -> bool {
        other.keys().iter().all(|key| !self.contains_key(key))
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + PartialEq,
{
    /// Entries present in both stores with equal values.
    pub fn intersection(&self, other: &KeyedStore<K, V>) -> KeyedStore<K, V> {
        let other = other.to_map();
        self.filter(|key, value| other.get(key) == Some(value))
    }

    /// Entries of `self` that `other` lacks or holds with a different value.
    pub fn difference(&self, other: &KeyedStore<K, V>) -> KeyedStore<K, V> {
        let other = other.to_map();
        self.filter(|key, value| other.get(key) != Some(value))
    }

    fn to_map(&self) -> HashMap<K, V, RandomState> {
        let mut map = HashMap::with_hasher(RandomState::new());
        map.extend(self.snapshot());
        map
    }
}
