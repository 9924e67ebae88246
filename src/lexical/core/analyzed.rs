//! Documents after extraction and tokenization.

/// One distinct token of a document and how often it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzedTerm {
    pub term: String,
    pub frequency: u32,
}

/// The indexable view of a payload: its distinct tokens with frequencies,
/// in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzedDocument {
    pub terms: Vec<AnalyzedTerm>,
}

impl AnalyzedDocument {
    pub fn from_frequencies(frequencies: Vec<(String, u32)>) -> Self {
        AnalyzedDocument {
            terms: frequencies
                .into_iter()
                .map(|(term, frequency)| AnalyzedTerm { term, frequency })
                .collect(),
        }
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| t.term.as_str())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
