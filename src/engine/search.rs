//! Query resolution over the inverted index.
//!
//! A query is tokenized with the engine's tokenizer, each token's posting
//! list is fetched, and candidates are scored by coverage (distinct query
//! tokens matched) and summed posting frequency.
//!
//! Ranking order is fixed: coverage descending, then frequency descending,
//! then [`DocId`] ascending. Results never depend on hash-map iteration order.

use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};

use crate::data::{DocId, Record};
use crate::engine::config::SearchOptions;
use crate::lexical::core::posting::Posting;
use crate::lexical::index::inverted::InvertedIndex;
use crate::lexical::index::merge::MergeStrategy;

/// Relevance of one search hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Score {
    /// Number of distinct query tokens the document contains.
    pub coverage: usize,
    /// Sum of the document's posting frequencies over the matched tokens.
    pub frequency: u64,
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coverage
            .cmp(&other.coverage)
            .then(self.frequency.cmp(&other.frequency))
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A matching document with its score.
#[derive(Debug, Clone)]
pub struct SearchHit<T> {
    pub record: Record<T>,
    pub score: Score,
}

impl<T> SearchHit<T> {
    pub fn id(&self) -> DocId {
        self.record.id
    }
}

/// A candidate document before it is resolved against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: Score,
}

impl ScoredDoc {
    /// Ranking order: better scores first, ties by ascending id.
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then(self.doc_id.cmp(&other.doc_id))
    }
}

/// Score and rank every document matching `tokens`.
///
/// `tokens` must already be normalized and deduplicated. In exact mode the
/// per-token doc-id lists are intersected, smallest first, with `strategy`
/// (or a strategy chosen per pair when `None`). In any mode candidates are
/// the union of all lists. The limit in `options` is not applied here, so
/// callers can skip candidates that disappear before they are resolved.
pub fn rank(
    index: &InvertedIndex,
    tokens: &[String],
    options: &SearchOptions,
    strategy: Option<MergeStrategy>,
) -> Vec<ScoredDoc> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let lists: Vec<Vec<Posting>> = tokens.iter().map(|t| index.postings(t)).collect();

    let mut scored = if options.exact_match {
        rank_exact(lists, strategy)
    } else {
        rank_any(&lists)
    };
    scored.sort_unstable_by(ScoredDoc::rank_cmp);
    scored
}

fn rank_any(lists: &[Vec<Posting>]) -> Vec<ScoredDoc> {
    let mut scores: AHashMap<DocId, Score> = AHashMap::new();
    for posting in lists.iter().flatten() {
        let score = scores.entry(posting.doc_id).or_default();
        score.coverage += 1;
        score.frequency += u64::from(posting.frequency);
    }
    scores
        .into_iter()
        .map(|(doc_id, score)| ScoredDoc { doc_id, score })
        .collect()
}

fn rank_exact(mut lists: Vec<Vec<Posting>>, strategy: Option<MergeStrategy>) -> Vec<ScoredDoc> {
    if lists.iter().any(Vec::is_empty) {
        return Vec::new();
    }
    lists.sort_by_key(Vec::len);

    let mut candidates = doc_ids(&lists[0]);
    for list in &lists[1..] {
        let ids = doc_ids(list);
        let strategy =
            strategy.unwrap_or_else(|| MergeStrategy::select(candidates.len(), ids.len(), false));
        candidates = strategy.intersect(candidates, &ids);
        if candidates.is_empty() {
            return Vec::new();
        }
    }

    let survivors: AHashSet<DocId> = candidates.into_iter().collect();
    let coverage = lists.len();
    let mut frequencies: AHashMap<DocId, u64> = AHashMap::with_capacity(survivors.len());
    for posting in lists.iter().flatten() {
        if survivors.contains(&posting.doc_id) {
            *frequencies.entry(posting.doc_id).or_default() += u64::from(posting.frequency);
        }
    }
    frequencies
        .into_iter()
        .map(|(doc_id, frequency)| ScoredDoc {
            doc_id,
            score: Score {
                coverage,
                frequency,
            },
        })
        .collect()
}

fn doc_ids(list: &[Posting]) -> Vec<DocId> {
    list.iter().map(|p| p.doc_id).collect()
}
