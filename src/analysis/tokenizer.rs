//! Text normalization into index tokens.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::stop_words::DEFAULT_STOP_WORDS;

lazy_static! {
    /// Anything that is neither a letter, a digit nor whitespace.
    static ref PUNCTUATION: Regex =
        Regex::new(r"[^\p{L}\p{N}\s]+").expect("punctuation pattern is valid");
}

/// Turns raw text into normalized tokens.
///
/// Normalization strips punctuation, lowercases, splits on whitespace and
/// drops stop words. Tokens are not stemmed. The same tokenizer must be used
/// for documents and queries, otherwise lookups silently miss.
///
/// Cloning is cheap: the stop word set is shared.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: Arc<AHashSet<String>>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Create a tokenizer using the built-in English stop words.
    pub fn new() -> Self {
        Tokenizer {
            stop_words: Arc::clone(&DEFAULT_STOP_WORDS),
        }
    }

    /// Create a tokenizer with a custom stop word list.
    ///
    /// The words go through the same normalization as indexed text, so
    /// "The" and "the" are equivalent entries.
    pub fn with_stop_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = words
            .into_iter()
            .flat_map(|w| normalize(w.as_ref()))
            .collect();
        Tokenizer {
            stop_words: Arc::new(stop_words),
        }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// All non-stop-word tokens of `text`, in order, duplicates included.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        normalize(text)
            .into_iter()
            .filter(|token| !self.is_stop_word(token))
            .collect()
    }

    /// Distinct tokens of `text` in first-seen order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut seen = AHashSet::new();
        self.analyze(text)
            .into_iter()
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }

    /// Distinct tokens of `text` with their occurrence counts, in first-seen order.
    pub fn term_frequencies(&self, text: &str) -> Vec<(String, u32)> {
        let mut positions: AHashMap<String, usize> = AHashMap::new();
        let mut counts: Vec<(String, u32)> = Vec::new();
        for token in self.analyze(text) {
            match positions.get(&token) {
                Some(&pos) => counts[pos].1 += 1,
                None => {
                    positions.insert(token.clone(), counts.len());
                    counts.push((token, 1));
                }
            }
        }
        counts
    }
}

fn normalize(text: &str) -> Vec<String> {
    PUNCTUATION
        .replace_all(text, "")
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
