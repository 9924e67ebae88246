use serde::{Deserialize, Serialize};

use crate::error::{LumenError, Result};
use crate::lexical::index::merge::MergeStrategy;
use crate::store::keyed::default_shard_count;

/// Default capacity of the concurrent batch work queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default number of results returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Configuration for an [`Engine`](crate::Engine).
///
/// Every field has a default, so a partial JSON document such as
/// `{"index_fields": ["desc"]}` is a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fields to index. `None` indexes every scalar of the payload.
    /// Dotted paths (`meta.title`) address nested fields.
    pub index_fields: Option<Vec<String>>,
    /// Replaces the built-in English stop-word list.
    pub stop_words: Option<Vec<String>>,
    /// Worker threads for concurrent batch inserts. Defaults to the CPU count.
    pub workers: Option<usize>,
    /// Capacity of the bounded queue feeding batch workers.
    pub queue_capacity: usize,
    /// Shard count for the document store and the inverted index.
    pub shards: Option<usize>,
    /// Options used by [`Engine::search_default`](crate::Engine::search_default).
    pub search: SearchOptions,
    /// Force one intersection algorithm for exact search.
    /// `None` picks one per pair of posting lists.
    pub merge_strategy: Option<MergeStrategy>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            index_fields: None,
            stop_words: None,
            workers: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            shards: None,
            search: SearchOptions::default(),
            merge_strategy: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(LumenError::invalid_config("workers must be at least 1"));
        }
        if self.shards == Some(0) {
            return Err(LumenError::invalid_config("shards must be at least 1"));
        }
        if let Some(fields) = &self.index_fields {
            if let Some(bad) = fields
                .iter()
                .find(|f| f.is_empty() || f.split('.').any(str::is_empty))
            {
                return Err(LumenError::invalid_config(format!(
                    "invalid index field path: {bad:?}"
                )));
            }
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.unwrap_or_else(default_shard_count).max(1)
    }

    /// Queue capacity with zero normalized to one.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

/// Options for a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Only return documents containing every query token.
    pub exact_match: bool,
    /// Maximum number of results. Zero means unbounded.
    pub limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            exact_match: true,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl SearchOptions {
    /// Exact mode with the given limit.
    pub fn exact(limit: usize) -> Self {
        Self {
            exact_match: true,
            limit,
        }
    }

    /// Any mode with the given limit.
    pub fn any(limit: usize) -> Self {
        Self {
            exact_match: false,
            limit,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    pub fn index_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.index_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.stop_words = Some(words.into_iter().map(Into::into).collect());
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = Some(workers);
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn shards(mut self, shards: usize) -> Self {
        self.config.shards = Some(shards);
        self
    }

    pub fn search(mut self, options: SearchOptions) -> Self {
        self.config.search = options;
        self
    }

    pub fn merge_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.config.merge_strategy = Some(strategy);
        self
    }

    pub fn build(self) -> EngineConfig {
        self.config
    }
}
