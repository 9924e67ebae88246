//! # Lumen
//!
//! An embeddable, in-memory full-text search engine for Rust.
//!
//! ## Features
//!
//! - Typed documents: any `Serialize` payload, or any type with a custom extractor
//! - Exact (all tokens) and any-token search with deterministic ranking
//! - Consistent index maintenance across insert, update and delete
//! - Concurrent, cancellable batch ingestion
//!
//! ## Example
//!
//! ```
//! use lumen::{Engine, EngineConfig, SearchOptions};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Code {
//!     code: String,
//!     desc: String,
//! }
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! engine.insert(Code {
//!     code: "A000".into(),
//!     desc: "Cholera due to Vibrio cholerae".into(),
//! })?;
//!
//! let hits = engine.search("cholera", &SearchOptions::default());
//! assert_eq!(hits[0].payload.code, "A000");
//! # Ok::<(), lumen::LumenError>(())
//! ```

pub mod analysis;
mod data;
mod engine;
mod error;
pub mod lexical;
pub mod store;
pub mod util;

// Re-exports for the public API
pub use analysis::Tokenizer;
pub use data::{DocId, Record};
pub use engine::batch::{BatchControl, BatchReport};
pub use engine::config::{EngineConfig, EngineConfigBuilder, SearchOptions};
pub use engine::search::{Score, SearchHit};
pub use engine::{ConsistencyReport, Engine, EngineBuilder, EngineStats};
pub use error::{LumenError, Result};
pub use lexical::extractor::{AllowListExtractor, FieldExtractor, FnExtractor, StructuralExtractor};
pub use lexical::index::merge::MergeStrategy;
pub use lexical::core::posting::Posting;
pub use store::KeyedStore;
pub use util::id::{IdGenerator, SequentialIdGenerator, ShardedIdGenerator};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
