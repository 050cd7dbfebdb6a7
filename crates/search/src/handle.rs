//! Shared, atomically replaceable corpus statistics
//!
//! Scorers hold an `Arc<CorpusStatistics>` snapshot for the lifetime of a
//! query. A rebuild computes new statistics without holding the lock and
//! then swaps the pointer, so readers never wait on a rebuild and never
//! observe a half-built table.

use crate::persist;
use crate::stats::CorpusStatistics;
use parking_lot::RwLock;
use recall_core::{DocumentStore, RecallError, RecallResult};
use std::path::Path;
use std::sync::Arc;

/// Process-wide handle to the current corpus statistics.
#[derive(Debug, Default)]
pub struct StatsHandle {
    current: RwLock<Arc<CorpusStatistics>>,
}

impl StatsHandle {
    /// Wrap existing statistics
    pub fn new(stats: CorpusStatistics) -> Self {
        StatsHandle {
            current: RwLock::new(Arc::new(stats)),
        }
    }

    /// Handle holding the empty statistics
    pub fn empty() -> Self {
        Self::new(CorpusStatistics::empty())
    }

    /// The statistics in effect right now.
    ///
    /// The returned `Arc` stays valid across later replacements.
    pub fn snapshot(&self) -> Arc<CorpusStatistics> {
        self.current.read().clone()
    }

    /// Swap in new statistics, returning the previous ones.
    pub fn replace(&self, stats: CorpusStatistics) -> Arc<CorpusStatistics> {
        let next = Arc::new(stats);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Recompute from the full corpus and swap.
    ///
    /// # Errors
    ///
    /// `RecallError::InvalidInput` if the store holds no documents; the
    /// current statistics are left untouched in that case.
    pub async fn rebuild(&self, store: &dyn DocumentStore) -> RecallResult<Arc<CorpusStatistics>> {
        let documents = store.get_all().await?;
        let options = self.snapshot().tokenizer_options();
        let stats = CorpusStatistics::build_with(&documents, &options)?;
        let next = Arc::new(stats);
        *self.current.write() = Arc::clone(&next);
        tracing::info!(
            target: "recall::stats",
            total_documents = next.total_documents(),
            "Corpus statistics rebuilt"
        );
        Ok(next)
    }

    /// Rebuild, then persist the result to `path`.
    pub async fn rebuild_and_save(
        &self,
        store: &dyn DocumentStore,
        path: &Path,
    ) -> RecallResult<Arc<CorpusStatistics>> {
        let stats = self.rebuild(store).await?;
        persist::save(&stats, path)?;
        Ok(stats)
    }

    /// Startup initialization.
    ///
    /// Loads `path`; if that yields no statistics, rebuilds from `store` and
    /// persists the fresh build. An empty corpus is not an error: the handle
    /// starts with empty statistics and BM25 contributes nothing until a
    /// later rebuild.
    pub async fn load_or_rebuild(path: &Path, store: &dyn DocumentStore) -> RecallResult<Self> {
        let loaded = persist::load(path);
        if !loaded.is_empty() {
            return Ok(Self::new(loaded));
        }

        let handle = Self::empty();
        match handle.rebuild_and_save(store, path).await {
            Ok(_) => Ok(handle),
            Err(RecallError::InvalidInput(msg)) => {
                tracing::warn!(
                    target: "recall::stats",
                    reason = %msg,
                    "Corpus is empty; lexical scoring disabled until rebuild"
                );
                Ok(handle)
            }
            Err(e) => Err(e),
        }
    }
}
