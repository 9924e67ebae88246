pub mod batch;
pub mod config;
pub mod search;

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;

use crate::analysis::Tokenizer;
use crate::data::{DocId, Record};
use crate::error::{LumenError, Result};
use crate::lexical::core::posting::Posting;
use crate::lexical::extractor::{AllowListExtractor, FieldExtractor, StructuralExtractor};
use crate::lexical::index::inverted::InvertedIndex;
use crate::lexical::index::inverted::writer::Indexer;
use crate::store::KeyedStore;
use crate::util::id::{IdGenerator, SequentialIdGenerator};

use self::batch::{BatchControl, BatchReport};
use self::config::{EngineConfig, SearchOptions};
use self::search::{SearchHit, rank};

/// In-memory document store paired with an inverted index.
///
/// The engine owns both structures and keeps them consistent: after any
/// sequence of inserts, updates and deletes, the tokens indexed for a
/// document are exactly the tokens of its current payload.
///
/// Mutations of the same document are serialized by a striped per-document
/// lock, which is always taken before any store or index lock. Mutations of
/// different documents run concurrently.
pub struct Engine<T> {
    config: EngineConfig,
    documents: KeyedStore<DocId, Arc<T>>,
    indexer: Indexer<T>,
    id_generator: Arc<dyn IdGenerator>,
    doc_locks: Box<[Mutex<()>]>,
}

impl<T> fmt::Debug for Engine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("documents", &self.documents.len())
            .field("indexer", &self.indexer)
            .field("id_generator", &self.id_generator)
            .finish()
    }
}

/// Document, token and posting counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub documents: usize,
    pub tokens: usize,
    pub postings: usize,
}

/// Differences between the index and what the stored payloads imply.
///
/// Entries are `(token, doc_id, frequency)`, sorted. A posting with the wrong
/// frequency appears in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Postings in the index that no stored payload accounts for.
    pub stale: Vec<(String, DocId, u32)>,
    /// Postings a stored payload implies but the index lacks.
    pub missing: Vec<(String, DocId, u32)>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.stale.is_empty() && self.missing.is_empty()
    }
}

type PostingKey = (String, DocId);

impl<T: Serialize + 'static> Engine<T> {
    /// Create an engine using the extractor selected by `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::builder(config).with_default_extractor().build()
    }
}

impl<T> Engine<T> {
    pub fn builder(config: EngineConfig) -> EngineBuilder<T> {
        EngineBuilder::new(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        self.indexer.tokenizer()
    }

    fn lock_document(&self, id: DocId) -> MutexGuard<'_, ()> {
        let stripe = (id.as_u64() % self.doc_locks.len() as u64) as usize;
        self.doc_locks[stripe].lock()
    }

    /// Store and index a new document under a freshly generated id.
    ///
    /// The payload is analyzed before anything is written, so an
    /// `InvalidInput` error leaves the engine untouched. If the generator
    /// returns an id that is already live, nothing is written and
    /// `DuplicateId` is returned.
    pub fn insert(&self, payload: T) -> Result<Record<T>> {
        let analyzed = self.indexer.analyze(&payload)?;
        let id = self.id_generator.next_id()?;
        let payload = Arc::new(payload);

        let _guard = self.lock_document(id);
        let (_, existed) = self.documents.get_or_set(id, Arc::clone(&payload));
        if existed {
            return Err(LumenError::DuplicateId(id));
        }
        self.indexer.index_analyzed(id, &analyzed);
        Ok(Record::new(id, payload))
    }

    /// Insert `payloads` one at a time, continuing past failures.
    ///
    /// Returns one error per payload that could not be inserted.
    pub fn insert_batch(&self, payloads: Vec<T>) -> Vec<LumenError> {
        debug!("inserting batch of {} documents", payloads.len());
        let report = batch::run_sequential(payloads, |payload| self.insert(payload).map(drop));
        debug!(
            "batch finished: {} inserted, {} failed",
            report.inserted,
            report.errors.len()
        );
        report.errors
    }

    /// Replace the payload of `id`, fully re-indexing it.
    ///
    /// The old payload is de-indexed completely before the new one is
    /// indexed. Fails with `NotFound` if `id` is not stored.
    pub fn update(&self, id: DocId, payload: T) -> Result<Record<T>> {
        let analyzed = self.indexer.analyze(&payload)?;
        let payload = Arc::new(payload);

        let _guard = self.lock_document(id);
        let old = self
            .documents
            .get(&id)
            .ok_or_else(|| LumenError::not_found(id.to_string()))?;
        let old_analyzed = self.indexer.analyze(&old)?;

        self.indexer.deindex_analyzed(id, &old_analyzed);
        self.documents.set(id, Arc::clone(&payload));
        self.indexer.index_analyzed(id, &analyzed);
        Ok(Record::new(id, payload))
    }

    /// De-index and remove `id`. Fails with `NotFound` if it is not stored.
    pub fn delete(&self, id: DocId) -> Result<()> {
        let _guard = self.lock_document(id);
        let old = self
            .documents
            .get(&id)
            .ok_or_else(|| LumenError::not_found(id.to_string()))?;
        let old_analyzed = self.indexer.analyze(&old)?;

        self.indexer.deindex_analyzed(id, &old_analyzed);
        self.documents.delete(&id);
        Ok(())
    }

    pub fn get(&self, id: DocId) -> Option<Record<T>> {
        self.documents
            .get(&id)
            .map(|payload| Record::new(id, payload))
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.documents.contains_key(&id)
    }

    /// Matching documents in ranking order.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<Record<T>> {
        self.search_scored(query, options)
            .into_iter()
            .map(|hit| hit.record)
            .collect()
    }

    /// [`search`](Self::search) with the options from the engine config.
    pub fn search_default(&self, query: &str) -> Vec<Record<T>> {
        self.search(query, &self.config.search)
    }

    /// Documents containing every query token, at most `limit` (0 = unbounded).
    pub fn exact_match(&self, query: &str, limit: usize) -> Vec<Record<T>> {
        self.search(query, &SearchOptions::exact(limit))
    }

    /// Matching documents with their scores.
    ///
    /// Ordered by coverage descending, then summed frequency descending, then
    /// id ascending. A query with no indexable tokens matches nothing.
    pub fn search_scored(&self, query: &str, options: &SearchOptions) -> Vec<SearchHit<T>> {
        let tokens = self.indexer.tokenizer().tokenize(query);
        let ranked = rank(
            self.indexer.index(),
            &tokens,
            options,
            self.config.merge_strategy,
        );

        let limit = if options.limit == 0 {
            usize::MAX
        } else {
            options.limit
        };
        let mut hits = Vec::with_capacity(ranked.len().min(limit));
        for scored in ranked {
            if hits.len() == limit {
                break;
            }
            match self.documents.get(&scored.doc_id) {
                Some(payload) => hits.push(SearchHit {
                    record: Record::new(scored.doc_id, payload),
                    score: scored.score,
                }),
                None => warn!(
                    "document {} matched {query:?} but is no longer stored",
                    scored.doc_id
                ),
            }
        }
        hits
    }

    /// Number of distinct indexed tokens.
    pub fn index_size(&self) -> usize {
        self.indexer.index().len()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Postings stored under `token`, sorted by id.
    ///
    /// `token` is looked up as given; it is not normalized.
    pub fn postings(&self, token: &str) -> Vec<Posting> {
        let mut postings = self.indexer.index().postings(token);
        postings.sort_unstable_by_key(|p| p.doc_id);
        postings
    }

    /// Tokens the index currently attributes to `id`, sorted.
    pub fn indexed_tokens(&self, id: DocId) -> Vec<String> {
        self.indexer.index().tokens_for(id)
    }

    pub fn stats(&self) -> EngineStats {
        let index = self.indexer.index().stats();
        EngineStats {
            documents: self.documents.len(),
            tokens: index.tokens,
            postings: index.postings,
        }
    }

    /// Rebuild the postings implied by the stored payloads and compare them
    /// with the live index.
    ///
    /// Meant for quiescent engines; documents mutated while the check runs
    /// may be reported spuriously.
    pub fn check_consistency(&self) -> Result<ConsistencyReport> {
        let shards = self.config.shard_count();

        let expected: KeyedStore<PostingKey, u32> = KeyedStore::with_shards(shards);
        for (id, payload) in self.documents.snapshot() {
            let analyzed = self.indexer.analyze(&payload)?;
            for term in analyzed.terms {
                expected.set((term.term, id), term.frequency);
            }
        }

        let actual: KeyedStore<PostingKey, u32> = KeyedStore::with_shards(shards);
        for (token, list) in self.indexer.index().store().snapshot() {
            for posting in list.iter() {
                actual.set((token.clone(), posting.doc_id), posting.frequency);
            }
        }

        let report = ConsistencyReport {
            stale: sorted_entries(&actual.difference(&expected)),
            missing: sorted_entries(&expected.difference(&actual)),
        };
        if !report.is_consistent() {
            warn!(
                "index inconsistent: {} stale, {} missing postings",
                report.stale.len(),
                report.missing.len()
            );
        }
        Ok(report)
    }
}

fn sorted_entries(store: &KeyedStore<PostingKey, u32>) -> Vec<(String, DocId, u32)> {
    let mut entries: Vec<_> = store
        .snapshot()
        .into_iter()
        .map(|((token, id), frequency)| (token, id, frequency))
        .collect();
    entries.sort_unstable();
    entries
}

impl<T: Send + Sync> Engine<T> {
    /// Insert `payloads` on a worker pool. Returns one error per failed payload.
    pub fn insert_batch_concurrent(&self, payloads: Vec<T>) -> Vec<LumenError> {
        self.insert_batch_concurrent_with(payloads, &BatchControl::new())
            .errors
    }

    /// Insert `payloads` on a worker pool, stopping early if `control` is
    /// cancelled.
    ///
    /// Payloads are fed through a bounded queue to `workers` threads, each
    /// calling [`insert`](Self::insert). Every admitted payload is fully
    /// indexed by the time this returns.
    pub fn insert_batch_concurrent_with(
        &self,
        payloads: Vec<T>,
        control: &BatchControl,
    ) -> BatchReport {
        let workers = self.config.worker_count();
        debug!(
            "inserting batch of {} documents on {workers} workers",
            payloads.len()
        );
        let report = batch::run(
            payloads,
            workers,
            self.config.queue_capacity(),
            control,
            |payload| self.insert(payload).map(drop),
        );
        debug!(
            "batch finished: {} inserted, {} skipped, {} failed",
            report.inserted,
            report.skipped,
            report.errors.len()
        );
        report
    }
}

/// Builds an [`Engine`] with an optional custom extractor or id generator.
pub struct EngineBuilder<T> {
    config: EngineConfig,
    extractor: Option<Arc<dyn FieldExtractor<T>>>,
    id_generator: Option<Arc<dyn IdGenerator>>,
}

impl<T> EngineBuilder<T> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            extractor: None,
            id_generator: None,
        }
    }

    pub fn extractor(mut self, extractor: Arc<dyn FieldExtractor<T>>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn id_generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.id_generator = Some(generator);
        self
    }

    /// Validate the config and assemble the engine.
    ///
    /// Fails with `InvalidConfig` if no extractor was supplied.
    pub fn build(self) -> Result<Engine<T>> {
        self.config.validate()?;
        let extractor = self
            .extractor
            .ok_or_else(|| LumenError::invalid_config("no field extractor configured"))?;
        let id_generator = self
            .id_generator
            .unwrap_or_else(|| Arc::new(SequentialIdGenerator::new()));

        let tokenizer = match &self.config.stop_words {
            Some(words) => Tokenizer::with_stop_words(words),
            None => Tokenizer::new(),
        };
        let shards = self.config.shard_count();
        let index = InvertedIndex::with_shards(shards);
        let doc_locks = (0..shards).map(|_| Mutex::new(())).collect();

        debug!(
            "engine created: extractor={}, shards={shards}, workers={}",
            extractor.name(),
            self.config.worker_count()
        );

        Ok(Engine {
            documents: KeyedStore::with_shards(shards),
            indexer: Indexer::new(extractor, tokenizer, index),
            id_generator,
            doc_locks,
            config: self.config,
        })
    }
}

impl<T: Serialize + 'static> EngineBuilder<T> {
    /// Use the extractor the config selects: an allow-list when
    /// `index_fields` is set, every scalar field otherwise.
    pub fn with_default_extractor(mut self) -> Self {
        let extractor: Arc<dyn FieldExtractor<T>> = match &self.config.index_fields {
            Some(fields) => Arc::new(AllowListExtractor::new(fields.iter().cloned())),
            None => Arc::new(StructuralExtractor),
        };
        self.extractor = Some(extractor);
        self
    }
}
