//! The inverted index: token → posting list.

pub mod writer;

use crate::data::DocId;
use crate::lexical::core::analyzed::AnalyzedDocument;
use crate::lexical::core::posting::{Posting, PostingList};
use crate::store::KeyedStore;

/// Statistics about the index contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvertedIndexStats {
    /// Number of distinct tokens.
    pub tokens: usize,
    /// Total number of (token, document) postings.
    pub postings: usize,
}

/// Maps each token to the documents containing it.
///
/// Tokens whose posting list becomes empty are dropped, so a token is a key
/// exactly when some indexed document contains it.
#[derive(Debug)]
pub struct InvertedIndex {
    postings: KeyedStore<String, PostingList>,
}

impl Default for InvertedIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InvertedIndex {
    pub fn new() -> Self {
        InvertedIndex {
            postings: KeyedStore::new(),
        }
    }

    pub fn with_shards(shards: usize) -> Self {
        InvertedIndex {
            postings: KeyedStore::with_shards(shards),
        }
    }

    /// Upsert a posting for `doc_id` under every term of `analyzed`.
    ///
    /// Each term's list is created if needed and updated under its shard
    /// lock, so concurrent writers on the same term never lose postings.
    pub fn add_document(&self, doc_id: DocId, analyzed: &AnalyzedDocument) {
        for term in &analyzed.terms {
            self.postings.upsert_with(term.term.clone(), PostingList::new, |list| {
                list.upsert(Posting::new(doc_id, term.frequency))
            });
        }
    }

    /// Remove the posting for `doc_id` under each of `tokens`.
    ///
    /// Returns how many postings were actually removed.
    pub fn remove_document<'a, I>(&self, doc_id: DocId, tokens: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut removed = 0;
        for token in tokens {
            self.postings.modify_or_remove(token, |list| {
                if list.remove(doc_id).is_some() {
                    removed += 1;
                }
                !list.is_empty()
            });
        }
        removed
    }

    /// Copy of the posting list for `token`; empty if the token is unknown.
    pub fn postings(&self, token: &str) -> Vec<Posting> {
        self.postings
            .with(token, |list| list.iter().collect())
            .unwrap_or_default()
    }

    /// Number of documents containing `token`.
    pub fn doc_frequency(&self, token: &str) -> usize {
        self.postings.with(token, PostingList::len).unwrap_or(0)
    }

    pub fn contains_token(&self, token: &str) -> bool {
        self.postings.contains_key(token)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Every token with a posting for `doc_id`, sorted. Scans the whole index.
    pub fn tokens_for(&self, doc_id: DocId) -> Vec<String> {
        let mut tokens = Vec::new();
        self.postings.for_each(|token, list| {
            if list.contains(doc_id) {
                tokens.push(token.clone());
            }
            true
        });
        tokens.sort_unstable();
        tokens
    }

    pub fn stats(&self) -> InvertedIndexStats {
        let mut stats = InvertedIndexStats::default();
        self.postings.for_each(|_, list| {
            stats.tokens += 1;
            stats.postings += list.len();
            true
        });
        stats
    }

    pub(crate) fn store(&self) -> &KeyedStore<String, PostingList> {
        &self.postings
    }
}
