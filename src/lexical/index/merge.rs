//! Posting-list merge algorithms.
//!
//! Search combines the doc-id lists of several tokens. Which intersection is
//! cheapest depends on the lists:
//!
//! | Strategy         | Cost              | Needs                      |
//! |------------------|-------------------|----------------------------|
//! | `Naive`          | O(n·m)            | nothing; best for tiny lists |
//! | `BinarySearch`   | O(n log m)        | right side sorted          |
//! | `SortedMerge`    | O(n + m)          | both sides sorted          |
//! | `Hash`           | O(n + m) expected | hashable items             |
//!
//! Posting lists are unordered maps, so [`MergeStrategy::select`] falls back to
//! `Hash` unless the inputs are tiny or already known to be sorted.

use std::cmp::Ordering;
use std::hash::Hash;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::data::DocId;

/// Above this `n·m` the quadratic scan stops paying off.
pub const NAIVE_MAX_WORK: usize = 256;

/// Intersection algorithm used when combining posting lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    Naive,
    BinarySearch,
    SortedMerge,
    Hash,
}

impl MergeStrategy {
    /// Pick a strategy for lists of `left` and `right` items.
    pub fn select(left: usize, right: usize, sorted: bool) -> Self {
        if left.saturating_mul(right) <= NAIVE_MAX_WORK {
            MergeStrategy::Naive
        } else if sorted {
            MergeStrategy::SortedMerge
        } else {
            MergeStrategy::Hash
        }
    }

    /// Whether this strategy wants its inputs sorted.
    pub fn needs_sorted_input(self) -> bool {
        matches!(self, MergeStrategy::BinarySearch | MergeStrategy::SortedMerge)
    }

    /// Intersect two doc-id lists. `left` is consumed.
    ///
    /// The strategies that need sorted input sort unsorted arguments first,
    /// so callers may pass lists in any order. The result preserves `left`'s
    /// order for the order-preserving strategies; callers that need a
    /// particular order must sort it themselves.
    pub fn intersect(self, mut left: Vec<DocId>, right: &[DocId]) -> Vec<DocId> {
        match self {
            MergeStrategy::Naive => naive_intersection(&left, right),
            MergeStrategy::Hash => hash_intersection(&left, right),
            MergeStrategy::BinarySearch => {
                let right = sorted_copy(right);
                binary_search_intersection(&left, &right)
            }
            MergeStrategy::SortedMerge => {
                left.sort_unstable();
                let right = sorted_copy(right);
                sorted_merge_intersection(left, &right, DocId::cmp)
            }
        }
    }
}

fn sorted_copy(items: &[DocId]) -> Vec<DocId> {
    let mut sorted = items.to_vec();
    if !sorted.is_sorted() {
        sorted.sort_unstable();
    }
    sorted
}

/// Items of `left` contained in `right`, probing `right` linearly. O(n·m).
pub fn naive_intersection<T: PartialEq + Clone>(left: &[T], right: &[T]) -> Vec<T> {
    left.iter()
        .filter(|item| right.contains(item))
        .cloned()
        .collect()
}

/// Items of `left` found in the sorted slice `right` by binary search. O(n log m).
pub fn binary_search_intersection<T: Ord + Clone>(left: &[T], right: &[T]) -> Vec<T> {
    left.iter()
        .filter(|item| right.binary_search(item).is_ok())
        .cloned()
        .collect()
}

/// Two-pointer intersection of two lists sorted by `compare`. O(n + m).
///
/// `left` is taken by value: matches are swapped to its front in place and
/// the rest is truncated away, so its original contents and order are gone.
pub fn sorted_merge_intersection<T, F>(mut left: Vec<T>, right: &[T], mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        match compare(&left[i], &right[j]) {
            Ordering::Equal => {
                left.swap(k, i);
                i += 1;
                j += 1;
                k += 1;
            }
            Ordering::Greater => j += 1,
            Ordering::Less => i += 1,
        }
    }
    left.truncate(k);
    left
}

/// Items of `right` also present in `left`, via a hash set of `left`. O(n + m).
pub fn hash_intersection<T: Eq + Hash + Clone>(left: &[T], right: &[T]) -> Vec<T> {
    let set: AHashSet<&T> = left.iter().collect();
    right
        .iter()
        .filter(|item| set.contains(item))
        .cloned()
        .collect()
}

/// Distinct items of both lists, `left` first, each in first-seen order. O(n + m).
pub fn hash_union<T: Eq + Hash + Clone>(left: &[T], right: &[T]) -> Vec<T> {
    let mut seen: AHashSet<&T> = AHashSet::with_capacity(left.len() + right.len());
    left.iter()
        .chain(right)
        .filter(|item| seen.insert(*item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<DocId> {
        raw.iter().copied().map(DocId::new).collect()
    }

    fn sorted(mut v: Vec<DocId>) -> Vec<DocId> {
        v.sort();
        v
    }

    #[test]
    fn test_naive() {
        assert_eq!(naive_intersection(&[1, 2, 3, 4], &[4, 2, 9]), vec![2, 4]);
        assert!(naive_intersection::<i32>(&[], &[1]).is_empty());
    }

    #[test]
    fn test_binary_search() {
        assert_eq!(binary_search_intersection(&[5, 1, 3], &[1, 2, 3, 4]), vec![1, 3]);
    }

    #[test]
    fn test_sorted_merge_consumes_left() {
        let left = vec![1, 3, 5, 7, 9];
        let result = sorted_merge_intersection(left, &[2, 3, 4, 7, 10], i32::cmp);
        assert_eq!(result, vec![3, 7]);
    }

    #[test]
    fn test_sorted_merge_custom_comparator() {
        let left = vec![9, 7, 5, 3];
        let right = [8, 7, 3, 1];
        let result = sorted_merge_intersection(left, &right, |a: &i32, b: &i32| b.cmp(a));
        assert_eq!(result, vec![7, 3]);
    }

    #[test]
    fn test_hash_intersection_and_union() {
        assert_eq!(hash_intersection(&[1, 2, 3], &[3, 4, 1]), vec![3, 1]);
        assert_eq!(hash_union(&[1, 2, 2], &[3, 1, 4]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_all_strategies_agree() {
        let left = ids(&[40, 3, 17, 8, 99, 23, 5, 61, 12, 77, 2, 31, 54, 19, 88, 6, 70]);
        let right = ids(&[8, 99, 100, 2, 61, 45, 19, 7, 70, 33, 3, 90, 11, 27, 64, 5, 81]);
        let expected = ids(&[2, 3, 5, 8, 19, 61, 70, 99]);

        for strategy in [
            MergeStrategy::Naive,
            MergeStrategy::BinarySearch,
            MergeStrategy::SortedMerge,
            MergeStrategy::Hash,
        ] {
            let result = strategy.intersect(left.clone(), &right);
            assert_eq!(sorted(result), expected, "{strategy:?}");
        }
    }

    #[test]
    fn test_select() {
        assert_eq!(MergeStrategy::select(4, 8, false), MergeStrategy::Naive);
        assert_eq!(MergeStrategy::select(1000, 1000, true), MergeStrategy::SortedMerge);
        assert_eq!(MergeStrategy::select(1000, 1000, false), MergeStrategy::Hash);
        assert!(MergeStrategy::SortedMerge.needs_sorted_input());
        assert!(!MergeStrategy::Hash.needs_sorted_input());
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&MergeStrategy::SortedMerge).unwrap();
        assert_eq!(json, "\"sorted_merge\"");
        let parsed: MergeStrategy = serde_json::from_str("\"binary_search\"").unwrap();
        assert_eq!(parsed, MergeStrategy::BinarySearch);
    }
}
