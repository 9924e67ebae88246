//! Lexical (keyword) indexing.
//!
//! # Module Structure
//!
//! - `core`: postings and analyzed documents
//! - `extractor`: strategies deciding which parts of a payload are indexable
//! - `index`: the inverted index, its writer, and posting-list merge algorithms

pub mod core;
pub mod extractor;
pub mod index;

pub use core::analyzed::{AnalyzedDocument, AnalyzedTerm};
pub use core::posting::{Posting, PostingList};
pub use extractor::{AllowListExtractor, FieldExtractor, FnExtractor, StructuralExtractor};
pub use index::inverted::writer::Indexer;
pub use index::inverted::{InvertedIndex, InvertedIndexStats};
pub use index::merge::MergeStrategy;
