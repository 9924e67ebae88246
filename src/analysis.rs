//! Text analysis: turning raw text into index tokens.
//!
//! ```text
//! Text → strip punctuation → lowercase → split → stop words → Tokens
//! ```
//!
//! # Examples
//!
//! ```
//! use lumen::analysis::Tokenizer;
//!
//! let tokenizer = Tokenizer::new();
//! assert_eq!(tokenizer.tokenize("Hello, World!"), vec!["hello", "world"]);
//! ```

pub mod stop_words;
pub mod tokenizer;

pub use tokenizer::Tokenizer;
