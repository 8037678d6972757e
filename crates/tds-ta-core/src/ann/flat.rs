//! Exact brute-force nearest-neighbour search over squared L2 distance.
//!
//! Vectors are stored row-major in one contiguous `Vec<f32>`. A search scans
//! every row, so results are exact; ties in distance go to the lower
//! insertion ordinal.
//!
//! # Binary layout
//!
//! ```text
//! offset  size        field
//! 0       8           magic  "FLATL2\0\0"
//! 8       4           format version (u32 LE)
//! 12      4           dims (u32 LE)
//! 16      8           count (u64 LE)
//! 24      count×dims×4  vectors, f32 LE, row-major
//! ```

use std::cmp::Ordering;

use super::{NearestNeighbors, Neighbor};
use crate::embedding::{blob_to_vec, squared_l2, vec_to_blob};
use crate::error::{Result, RetrievalError};

pub(crate) const MAGIC: &[u8; 8] = b"FLATL2\0\0";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 24;

/// Exact index over squared Euclidean distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatL2Index {
    dims: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Create an empty index for vectors of `dims` components.
    pub fn new(dims: usize) -> Result<Self> {
        if dims == 0 {
            return Err(RetrievalError::ZeroDimension);
        }
        Ok(Self {
            dims,
            data: Vec::new(),
        })
    }

    /// Build an index from a batch of vectors, in order.
    pub fn from_vectors(dims: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dims)?;
        index.data.reserve(dims * vectors.len());
        for v in vectors {
            index.add(v)?;
        }
        Ok(index)
    }

    /// Append one vector; its ordinal is the previous [`len`](NearestNeighbors::len).
    pub fn add(&mut self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dims {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dims,
                actual: vector.len(),
            });
        }
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// The stored vector at `id`, if any.
    pub fn vector(&self, id: usize) -> Option<&[f32]> {
        let start = id.checked_mul(self.dims)?;
        self.data.get(start..start + self.dims)
    }

    /// Decode the binary layout described in the module docs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..8] != MAGIC {
            return Err(RetrievalError::corrupt("flat index header is missing"));
        }
        let version = u32::from_le_bytes(read_array(&bytes[8..12]));
        if version != FORMAT_VERSION {
            return Err(RetrievalError::corrupt(format!(
                "unsupported flat index version {}",
                version
            )));
        }
        let dims = u32::from_le_bytes(read_array(&bytes[12..16])) as usize;
        let count = u64::from_le_bytes(read_array(&bytes[16..24]));
        if dims == 0 {
            return Err(RetrievalError::corrupt("flat index has zero dimensions"));
        }

        let expected_body = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(dims))
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| RetrievalError::corrupt("flat index size overflows"))?;
        let body = &bytes[HEADER_LEN..];
        if body.len() != expected_body {
            return Err(RetrievalError::corrupt(format!(
                "flat index body is {} bytes, expected {} for {} vectors of {} dims",
                body.len(),
                expected_body,
                count,
                dims
            )));
        }

        Ok(Self {
            dims,
            data: blob_to_vec(body),
        })
    }
}

fn read_array<const N: usize>(slice: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(slice);
    out
}

fn by_distance_then_id(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| a.id.cmp(&b.id))
}

impl NearestNeighbors for FlatL2Index {
    fn kind(&self) -> &'static str {
        "flat-l2"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn len(&self) -> usize {
        self.data.len() / self.dims
    }

    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dims {
            return Err(RetrievalError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }
        let k = k.min(self.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut all: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dims)
            .enumerate()
            .map(|(id, row)| {
                let distance = squared_l2(query, row);
                Neighbor {
                    id,
                    // NaN rows rank after every real distance.
                    distance: if distance.is_nan() {
                        f32::INFINITY
                    } else {
                        distance
                    },
                }
            })
            .collect();

        if k < all.len() {
            all.select_nth_unstable_by(k - 1, by_distance_then_id);
            all.truncate(k);
        }
        all.sort_by(by_distance_then_id);
        Ok(all)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.data.len() * 4);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.dims as u32).to_le_bytes());
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        out.extend_from_slice(&vec_to_blob(&self.data));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlatL2Index {
        FlatL2Index::from_vectors(
            2,
            &[
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 2.0],
                vec![3.0, 3.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_exact_ranking() {
        let index = sample();
        let hits = index.nearest(&[0.9, 0.1], 4).unwrap();
        let ids: Vec<usize> = hits.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 0, 2, 3]);
        assert!((hits[0].distance - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_k_is_clamped() {
        let index = sample();
        assert_eq!(index.nearest(&[0.0, 0.0], 0).unwrap().len(), 0);
        assert_eq!(index.nearest(&[0.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(index.nearest(&[0.0, 0.0], 100).unwrap().len(), 4);
    }

    #[test]
    fn test_ties_resolve_by_insertion_order() {
        let index =
            FlatL2Index::from_vectors(1, &[vec![1.0], vec![-1.0], vec![1.0], vec![5.0]]).unwrap();
        let ids: Vec<usize> = index
            .nearest(&[0.0], 3)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);

        let ids: Vec<usize> = index
            .nearest(&[0.0], 2)
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_dimension_checks() {
        let mut index = FlatL2Index::new(3).unwrap();
        let err = index.add(&[1.0, 2.0]).err().unwrap();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(index.nearest(&[1.0], 1).is_err());
        assert!(matches!(
            FlatL2Index::new(0),
            Err(RetrievalError::ZeroDimension)
        ));
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = FlatL2Index::new(4).unwrap();
        assert!(index.is_empty());
        assert!(index.nearest(&[0.0; 4], 3).unwrap().is_empty());
    }

    #[test]
    fn test_bytes_roundtrip_preserves_search() {
        let index = sample();
        let restored = FlatL2Index::from_bytes(&index.to_bytes()).unwrap();
        assert_eq!(restored, index);
        assert_eq!(restored.vector(2), Some(&[0.0, 2.0][..]));
        assert_eq!(restored.vector(4), None);
    }

    #[test]
    fn test_truncated_bytes_are_corrupt() {
        let bytes = sample().to_bytes();
        let err = FlatL2Index::from_bytes(&bytes[..bytes.len() - 3]).err().unwrap();
        assert!(matches!(err, RetrievalError::CorruptIndex { .. }));

        let err = FlatL2Index::from_bytes(&bytes[..10]).err().unwrap();
        assert!(matches!(err, RetrievalError::CorruptIndex { .. }));
    }

    #[test]
    fn test_wrong_version_is_corrupt() {
        let mut bytes = sample().to_bytes();
        bytes[8] = 9;
        let err = FlatL2Index::from_bytes(&bytes).err().unwrap();
        assert!(matches!(err, RetrievalError::CorruptIndex { .. }));
    }
}
