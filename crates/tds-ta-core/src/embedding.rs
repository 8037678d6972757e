//! Embedding trait and vector utilities.
//!
//! Defines the [`Embedder`] trait that every embedding backend implements,
//! plus pure helpers for vector encoding and distance computation.
//!
//! Concrete providers (fastembed, OpenAI, Ollama, hashed) live in the
//! `tds-ta` application crate.

/// A text-to-vector model.
///
/// Index and query embeddings must come from the same model and version.
/// Nothing in the engine can verify this; mixing models silently produces
/// meaningless rankings.
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;
    /// Embed a batch of texts, returning one vector per input in input order.
    ///
    /// This is a blocking call.
    fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Encode a float vector as little-endian `f32` bytes.
///
/// # Example
///
/// ```rust
/// use tds_ta_core::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12); // 3 × 4 bytes
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode little-endian `f32` bytes produced by [`vec_to_blob`].
///
/// Trailing bytes that do not form a whole `f32` are ignored.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Squared Euclidean distance between two vectors of equal length.
///
/// ```text
/// D(a, b) = Σ (aᵢ − bᵢ)²
/// ```
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Map a squared distance to a similarity score in `(0, 1]`.
///
/// Zero distance scores exactly `1.0`; the score falls towards `0` as the
/// distance grows. Infinite and NaN distances get the smallest positive score.
pub fn distance_to_score(distance: f32) -> f64 {
    if distance.is_nan() {
        return f64::MIN_POSITIVE;
    }
    (1.0 / (1.0 + f64::from(distance.max(0.0)))).max(f64::MIN_POSITIVE)
}
