//! Postings: which documents contain a token, and how often.

use std::collections::HashMap;

use ahash::RandomState;
use serde::{Deserialize, Serialize};

use crate::data::DocId;

/// Occurrence count of one token within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// Number of occurrences at the time the document was last indexed. Always >= 1.
    pub frequency: u32,
}

impl Posting {
    pub fn new(doc_id: DocId, frequency: u32) -> Self {
        Posting { doc_id, frequency }
    }
}

/// All postings for one token, keyed by document id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostingList {
    postings: HashMap<DocId, u32, RandomState>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the posting for `posting.doc_id`, returning the old frequency.
    pub fn upsert(&mut self, posting: Posting) -> Option<u32> {
        self.postings.insert(posting.doc_id, posting.frequency)
    }

    /// Remove the posting for `doc_id`, returning its frequency if present.
    pub fn remove(&mut self, doc_id: DocId) -> Option<u32> {
        self.postings.remove(&doc_id)
    }

    pub fn frequency(&self, doc_id: DocId) -> Option<u32> {
        self.postings.get(&doc_id).copied()
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.postings.contains_key(&doc_id)
    }

    /// Number of documents containing this token.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Postings in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = Posting> + '_ {
        self.postings
            .iter()
            .map(|(&doc_id, &frequency)| Posting { doc_id, frequency })
    }

    /// Postings ordered by document id.
    pub fn sorted(&self) -> Vec<Posting> {
        let mut postings: Vec<Posting> = self.iter().collect();
        postings.sort_unstable_by_key(|p| p.doc_id);
        postings
    }
}

impl FromIterator<Posting> for PostingList {
    fn from_iter<I: IntoIterator<Item = Posting>>(iter: I) -> Self {
        let mut list = PostingList::new();
        for posting in iter {
            list.upsert(posting);
        }
        list
    }
}
