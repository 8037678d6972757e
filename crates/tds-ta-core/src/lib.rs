//! # TDS Virtual TA Core
//!
//! The retrieval engine behind the TDS Virtual TA: document models, text
//! normalization, corpus segmentation, the embedding and similarity-structure
//! traits, and exact nearest-neighbour search.
//!
//! This crate performs no filesystem or network I/O. Embedding models are
//! injected through [`embedding::Embedder`]; persistence of the artifact pair
//! lives in the `tds-ta` application crate.
//!
//! ```text
//! corpus ──segment──▶ [Document] ──EmbeddingIndex::build──▶ index ──search──▶ [ScoredDocument]
//!            │                          │
//!       normalize::clean          Embedder + FlatL2Index
//! ```

pub mod ann;
pub mod embedding;
pub mod error;
pub mod index;
pub mod models;
pub mod normalize;
pub mod segment;

pub use error::{Result, RetrievalError};
