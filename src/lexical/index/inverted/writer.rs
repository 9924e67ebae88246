//! Keeps the inverted index in step with document payloads.

use std::fmt;
use std::sync::Arc;

use log::trace;

use crate::analysis::Tokenizer;
use crate::data::DocId;
use crate::error::Result;
use crate::lexical::core::analyzed::AnalyzedDocument;
use crate::lexical::extractor::FieldExtractor;
use crate::lexical::index::inverted::InvertedIndex;

/// Joins the fragments of one payload before tokenizing, so a token repeated
/// across fields collapses into a single posting.
pub const FIELD_SEPARATOR: &str = "\n";

/// Indexes and de-indexes payloads.
///
/// Both directions run the same extractor and tokenizer, which is what lets
/// de-indexing find every posting that indexing created. Updates are a full
/// de-index of the old payload followed by a full index of the new one.
pub struct Indexer<T> {
    extractor: Arc<dyn FieldExtractor<T>>,
    tokenizer: Tokenizer,
    index: InvertedIndex,
}

impl<T> fmt::Debug for Indexer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Indexer")
            .field("extractor", &self.extractor.name())
            .field("tokenizer", &self.tokenizer)
            .field("index", &self.index)
            .finish()
    }
}

impl<T> Indexer<T> {
    pub fn new(
        extractor: Arc<dyn FieldExtractor<T>>,
        tokenizer: Tokenizer,
        index: InvertedIndex,
    ) -> Self {
        Indexer {
            extractor,
            tokenizer,
            index,
        }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn extractor(&self) -> &dyn FieldExtractor<T> {
        self.extractor.as_ref()
    }

    /// Extract and tokenize `payload` without touching the index.
    pub fn analyze(&self, payload: &T) -> Result<AnalyzedDocument> {
        let fragments = self.extractor.extract(payload)?;
        let text = fragments.join(FIELD_SEPARATOR);
        Ok(AnalyzedDocument::from_frequencies(
            self.tokenizer.term_frequencies(&text),
        ))
    }

    /// Add postings for an already analyzed document.
    pub fn index_analyzed(&self, doc_id: DocId, analyzed: &AnalyzedDocument) {
        self.index.add_document(doc_id, analyzed);
        trace!("indexed document {doc_id}: {} tokens", analyzed.len());
    }

    /// Remove the postings an already analyzed document contributed.
    pub fn deindex_analyzed(&self, doc_id: DocId, analyzed: &AnalyzedDocument) -> usize {
        let removed = self.index.remove_document(doc_id, analyzed.tokens());
        trace!("de-indexed document {doc_id}: {removed} postings removed");
        removed
    }

    /// Extract, tokenize and index `payload` under `doc_id`.
    ///
    /// Returns the number of distinct tokens indexed. Nothing is written if
    /// extraction fails.
    pub fn index_document(&self, doc_id: DocId, payload: &T) -> Result<usize> {
        let analyzed = self.analyze(payload)?;
        self.index_analyzed(doc_id, &analyzed);
        Ok(analyzed.len())
    }

    /// Remove every posting `payload` contributed under `doc_id`.
    ///
    /// Returns the number of postings removed.
    pub fn deindex_document(&self, doc_id: DocId, payload: &T) -> Result<usize> {
        let analyzed = self.analyze(payload)?;
        Ok(self.deindex_analyzed(doc_id, &analyzed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::core::posting::Posting;
    use crate::lexical::extractor::{AllowListExtractor, StructuralExtractor};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Note {
        title: String,
        body: String,
    }

    fn note(title: &str, body: &str) -> Note {
        Note {
            title: title.into(),
            body: body.into(),
        }
    }

    fn indexer() -> Indexer<Note> {
        Indexer::new(
            Arc::new(StructuralExtractor),
            Tokenizer::new(),
            InvertedIndex::with_shards(4),
        )
    }

    #[test]
    fn test_frequencies_span_fields() {
        let indexer = indexer();
        let id = DocId::new(1);
        indexer
            .index_document(id, &note("Rust search", "search engines in rust, rust!"))
            .unwrap();

        assert_eq!(indexer.index().postings("rust"), vec![Posting::new(id, 3)]);
        assert_eq!(indexer.index().postings("search"), vec![Posting::new(id, 2)]);
        assert_eq!(indexer.index().postings("engines"), vec![Posting::new(id, 1)]);
    }

    #[test]
    fn test_deindex_removes_everything() {
        let indexer = indexer();
        let id = DocId::new(1);
        let payload = note("Cholera", "due to Vibrio cholerae");
        let indexed = indexer.index_document(id, &payload).unwrap();
        assert_eq!(indexed, 4);

        let removed = indexer.deindex_document(id, &payload).unwrap();
        assert_eq!(removed, 4);
        assert!(indexer.index().is_empty());
    }

    #[test]
    fn test_update_is_full_deindex_then_index() {
        let indexer = indexer();
        let id = DocId::new(7);
        let old = note("alpha beta", "gamma");
        let new = note("beta", "delta delta");

        indexer.index_document(id, &old).unwrap();
        indexer.deindex_document(id, &old).unwrap();
        indexer.index_document(id, &new).unwrap();

        assert_eq!(indexer.index().tokens_for(id), vec!["beta", "delta"]);
        assert_eq!(indexer.index().postings("delta"), vec![Posting::new(id, 2)]);
    }

    #[test]
    fn test_allow_list_limits_indexed_text() {
        let indexer: Indexer<Note> = Indexer::new(
            Arc::new(AllowListExtractor::new(["title"])),
            Tokenizer::new(),
            InvertedIndex::with_shards(2),
        );
        indexer
            .index_document(DocId::new(1), &note("visible", "hidden"))
            .unwrap();
        assert!(indexer.index().contains_token("visible"));
        assert!(!indexer.index().contains_token("hidden"));
    }
}
