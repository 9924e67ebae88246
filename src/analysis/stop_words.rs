//! Stop word lists.
//!
//! Stop words are compared against normalized tokens, i.e. after punctuation
//! has been stripped and the text lowercased. Contractions such as "don't"
//! therefore never appear here: once normalized they collide with content
//! words ("we'll" becomes "well").

use std::sync::Arc;

use ahash::AHashSet;
use lazy_static::lazy_static;

/// Common English function words excluded from indexing.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "cannot", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or",
    "other", "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why",
    "with", "would", "you", "your", "yours", "yourself", "yourselves",
];

lazy_static! {
    /// Process-wide English stop word set, built once on first use.
    pub static ref DEFAULT_STOP_WORDS: Arc<AHashSet<String>> =
        Arc::new(ENGLISH_STOP_WORDS.iter().map(|w| w.to_string()).collect());
}
