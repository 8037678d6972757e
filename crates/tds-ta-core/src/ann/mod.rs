//! Similarity-structure abstraction.
//!
//! The [`NearestNeighbors`] trait is the narrow interface the
//! [`EmbeddingIndex`](crate::index::EmbeddingIndex) searches through. The
//! exact [`FlatL2Index`] is the only implementation today; an approximate
//! structure can be swapped in behind the same trait without touching the
//! retrieval service.
//!
//! Implementations must be `Send + Sync`: a loaded structure is shared
//! read-only between concurrent searches.

pub mod flat;

pub use flat::FlatL2Index;

use crate::error::{Result, RetrievalError};

/// Id returned by structures that pad their answer when fewer than `k`
/// vectors are available. Callers filter it out.
pub const NO_MATCH: usize = usize::MAX;

/// A candidate returned by [`NearestNeighbors::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Insertion ordinal of the vector, or [`NO_MATCH`].
    pub id: usize,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

/// A searchable set of fixed-dimension vectors addressed by insertion ordinal.
pub trait NearestNeighbors: Send + Sync {
    /// Short identifier of the structure (e.g. `"flat-l2"`).
    fn kind(&self) -> &'static str;
    /// Dimensionality shared by every stored vector.
    fn dims(&self) -> usize;
    /// Number of stored vectors.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Up to `k` neighbours of `query`, closest first.
    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
    /// Serialize the structure for the binary index artifact.
    fn to_bytes(&self) -> Vec<u8>;
}

/// Decode a structure previously written with [`NearestNeighbors::to_bytes`].
///
/// The structure kind is recognised from the leading magic bytes.
pub fn decode_structure(bytes: &[u8]) -> Result<Box<dyn NearestNeighbors>> {
    if bytes.starts_with(flat::MAGIC) {
        return Ok(Box::new(FlatL2Index::from_bytes(bytes)?));
    }
    Err(RetrievalError::corrupt(
        "unrecognised similarity structure header",
    ))
}
