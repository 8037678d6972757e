//! Offline feature-hashing embedder.
//!
//! Terms are hashed into a fixed number of buckets with FNV-1a and weighted
//! by term frequency scaled by `1 + ln(len)`, then L2-normalized. Quality is
//! far below a neural model, but it needs no download or network, so it is
//! what tests and air-gapped installs use.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use tds_ta_core::embedding::Embedder;

pub const DEFAULT_DIMS: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Deterministic bag-of-words embedder.
#[derive(Debug, Clone)]
pub struct HashedProvider {
    dims: usize,
}

impl HashedProvider {
    pub fn new(dims: usize) -> Result<Self> {
        if dims == 0 {
            bail!("hashed embedder needs at least one dimension");
        }
        Ok(Self { dims })
    }

    fn bucket(&self, term: &str) -> usize {
        let hash = term.bytes().fold(FNV_OFFSET, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(FNV_PRIME)
        });
        (hash % self.dims as u64) as usize
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut counts: BTreeMap<String, f32> = BTreeMap::new();
        let mut total = 0usize;
        for term in tokenize(text) {
            *counts.entry(term).or_default() += 1.0;
            total += 1;
        }

        let mut vector = vec![0.0f32; self.dims];
        if total == 0 {
            return vector;
        }

        for (term, count) in &counts {
            let weight = (count / total as f32) * (1.0 + (term.chars().count() as f32).ln());
            vector[self.bucket(term)] += weight;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
}

impl Embedder for HashedProvider {
    fn model_name(&self) -> &str {
        "hashed-fnv1a"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}
