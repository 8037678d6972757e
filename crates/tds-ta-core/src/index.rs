//! The embedding index: documents frozen alongside their vectors.
//!
//! An [`EmbeddingIndex`] pairs a [`NearestNeighbors`] structure with the
//! ordered document list it was built from. Vector ordinal `i` always maps
//! to `documents[i]`; the pairing is fixed at construction and never
//! mutated, so a loaded index can be shared between threads and searched
//! without locking.
//!
//! # Scoring
//!
//! A neighbour at squared distance `D` scores `1 / (1 + D)`. An exact match
//! scores `1.0`. Results are returned best first; equal distances keep
//! insertion order.

use std::sync::Arc;

use crate::ann::{FlatL2Index, NearestNeighbors};
use crate::embedding::{distance_to_score, Embedder};
use crate::error::{Result, RetrievalError};
use crate::models::{Document, ScoredDocument};

/// Documents plus their vectors, searchable by free-text query.
pub struct EmbeddingIndex {
    embedder: Arc<dyn Embedder>,
    structure: Box<dyn NearestNeighbors>,
    documents: Vec<Document>,
}

impl std::fmt::Debug for EmbeddingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingIndex")
            .field("model", &self.embedder.model_name())
            .field("structure", &self.structure.kind())
            .field("dims", &self.structure.dims())
            .field("documents", &self.documents.len())
            .finish()
    }
}

impl EmbeddingIndex {
    /// Embed every document in one call and build an exact index.
    pub fn build(embedder: Arc<dyn Embedder>, documents: Vec<Document>) -> Result<Self> {
        Self::build_batched(embedder, documents, usize::MAX, |_, _| {})
    }

    /// Embed documents `batch_size` at a time and build an exact index.
    ///
    /// `on_progress(done, total)` runs after each batch.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::EmptyCorpus`] if `documents` is empty.
    /// - [`RetrievalError::Embedding`] if the model fails or returns the
    ///   wrong number of vectors.
    /// - [`RetrievalError::DimensionMismatch`] if vectors disagree in length.
    pub fn build_batched<F>(
        embedder: Arc<dyn Embedder>,
        documents: Vec<Document>,
        batch_size: usize,
        mut on_progress: F,
    ) -> Result<Self>
    where
        F: FnMut(usize, usize),
    {
        if documents.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }

        let total = documents.len();
        let mut structure: Option<FlatL2Index> = None;
        let mut done = 0usize;

        for batch in documents.chunks(batch_size.max(1)) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let vectors = embedder
                .embed(&texts)
                .map_err(RetrievalError::embedding)?;
            if vectors.len() != texts.len() {
                return Err(RetrievalError::embedding(format!(
                    "model returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }

            for v in &vectors {
                if structure.is_none() {
                    structure = Some(FlatL2Index::new(v.len())?);
                }
                if let Some(index) = structure.as_mut() {
                    index.add(v)?;
                }
            }

            done += batch.len();
            on_progress(done, total);
        }

        let structure = structure.ok_or(RetrievalError::EmptyCorpus)?;
        Self::from_parts(embedder, Box::new(structure), documents)
    }

    /// Pair an existing structure with its documents.
    ///
    /// # Errors
    ///
    /// - [`RetrievalError::CorruptIndex`] if the vector and document counts differ.
    /// - [`RetrievalError::DimensionMismatch`] if the embedder reports a
    ///   dimensionality different from the structure's.
    pub fn from_parts(
        embedder: Arc<dyn Embedder>,
        structure: Box<dyn NearestNeighbors>,
        documents: Vec<Document>,
    ) -> Result<Self> {
        if structure.len() != documents.len() {
            return Err(RetrievalError::corrupt(format!(
                "{} vectors but {} documents",
                structure.len(),
                documents.len()
            )));
        }
        let declared = embedder.dims();
        if declared != 0 && declared != structure.dims() {
            return Err(RetrievalError::DimensionMismatch {
                expected: structure.dims(),
                actual: declared,
            });
        }
        Ok(Self {
            embedder,
            structure,
            documents,
        })
    }

    /// The `k` documents closest to `query`, best first.
    ///
    /// Returns `min(k, len())` results. Embedding failures are returned as
    /// [`RetrievalError::Embedding`] with the model's error as the source.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>> {
        if k == 0 || self.documents.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self
            .embedder
            .embed(&[query.to_string()])
            .map_err(RetrievalError::embedding)?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::embedding("empty embedding response"))?;
        self.search_vector(&query_vec, k)
    }

    /// Like [`search`](Self::search) with a pre-computed query vector.
    pub fn search_vector(&self, query_vec: &[f32], k: usize) -> Result<Vec<ScoredDocument>> {
        let neighbors = self.structure.nearest(query_vec, k)?;

        let mut results: Vec<ScoredDocument> = neighbors
            .into_iter()
            .filter_map(|n| {
                self.documents.get(n.id).map(|doc| ScoredDocument {
                    document: doc.clone(),
                    score: distance_to_score(n.distance),
                })
            })
            .take(k)
            .collect();

        // Approximate structures need not return sorted candidates.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(results)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.structure.dims()
    }

    pub fn model_name(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn structure(&self) -> &dyn NearestNeighbors {
        self.structure.as_ref()
    }
}
