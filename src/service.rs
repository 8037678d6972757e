//! The serving-side entry point.
//!
//! A [`RetrievalService`] is constructed once with [`RetrievalService::initialize`]
//! and passed by reference to whatever answers questions. It owns the loaded
//! [`EmbeddingIndex`] read-only, so `&RetrievalService` can be shared across
//! threads and queried concurrently.
//!
//! There is no build-on-first-use: if no artifact pair exists at the
//! configured prefix, initialization fails with
//! [`RetrievalError::IndexNotFound`] and the caller is expected to exit.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use tds_ta_core::embedding::Embedder;
use tds_ta_core::index::EmbeddingIndex;
use tds_ta_core::models::ScoredDocument;
use tds_ta_core::RetrievalError;

use crate::artifacts;
use crate::config::Config;
use crate::embedding::create_provider;

/// Default number of context documents per question.
pub const DEFAULT_K: usize = 3;

#[derive(Debug)]
pub struct RetrievalService {
    index: EmbeddingIndex,
}

impl RetrievalService {
    /// Load the index named by `config.index.path` with the configured embedder.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::IndexNotFound`] when neither artifact exists.
    /// - Any [`artifacts::load`] error when the pair is incomplete or corrupt.
    /// - Provider construction errors (missing API key, unknown model).
    ///
    /// Engine errors are kept intact inside the `anyhow::Error`, so callers
    /// can `downcast_ref::<RetrievalError>()`.
    pub fn initialize(config: &Config) -> Result<Self> {
        let prefix = &config.index.path;
        if !artifacts::exists(prefix) {
            return Err(RetrievalError::IndexNotFound {
                prefix: prefix.clone(),
            }
            .into());
        }

        let embedder = create_provider(&config.embedding)?;
        Self::open(prefix, embedder)
    }

    /// Load the pair at `prefix` with an explicit embedder.
    pub fn open(prefix: &std::path::Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if !artifacts::exists(prefix) {
            return Err(RetrievalError::IndexNotFound {
                prefix: prefix.to_path_buf(),
            }
            .into());
        }
        let index = artifacts::load(prefix, embedder)?;
        info!(
            documents = index.len(),
            dims = index.dims(),
            model = index.model_name(),
            "retrieval service ready"
        );
        Ok(Self::from_index(index))
    }

    /// Wrap an index that is already in memory.
    pub fn from_index(index: EmbeddingIndex) -> Self {
        Self { index }
    }

    /// The `k` most relevant documents for `question`, best first.
    pub fn answer_context(&self, question: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        Ok(self.index.search(question, k)?)
    }

    pub fn index(&self) -> &EmbeddingIndex {
        &self.index
    }
}
