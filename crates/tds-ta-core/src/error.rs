//! Error taxonomy for the retrieval engine.
//!
//! Every fallible engine operation returns [`Result`], whose error side is
//! [`RetrievalError`]. Variants are fatal to the operation that raised them
//! and are never retried by the engine itself.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`EmptyCorpus`](RetrievalError::EmptyCorpus) | building an index from zero documents |
//! | [`MissingIndexArtifact`](RetrievalError::MissingIndexArtifact) | loading when one half of the artifact pair is absent |
//! | [`CorruptIndex`](RetrievalError::CorruptIndex) | decoding a malformed or inconsistent artifact pair |
//! | [`IndexNotFound`](RetrievalError::IndexNotFound) | service initialization with no built index |
//! | [`DimensionMismatch`](RetrievalError::DimensionMismatch) | vectors that disagree with the index dimensionality |
//! | [`ZeroDimension`](RetrievalError::ZeroDimension) | an embedder that reports or returns empty vectors |
//! | [`Embedding`](RetrievalError::Embedding) | the embedding model failing, passed through as the source |

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("cannot build an index from an empty document set")]
    EmptyCorpus,

    #[error("index artifact missing: {}", path.display())]
    MissingIndexArtifact { path: PathBuf },

    #[error("corrupt index: {reason}")]
    CorruptIndex { reason: String },

    #[error("no index found at '{}'; build it first with `ta build`", prefix.display())]
    IndexNotFound { prefix: PathBuf },

    #[error("vector dimensionality mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("vector dimensionality must be greater than zero")]
    ZeroDimension,

    #[error("embedding model failed: {0}")]
    Embedding(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RetrievalError {
    pub fn corrupt(reason: impl Into<String>) -> Self {
        Self::CorruptIndex {
            reason: reason.into(),
        }
    }

    pub fn embedding(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self::Embedding(err.into())
    }
}
