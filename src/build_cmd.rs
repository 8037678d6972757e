//! `ta build`: structured documents → persisted index.
//!
//! Loads the JSON document file, embeds it in batches with the configured
//! provider, builds the exact index, and writes the artifact pair. The pair
//! replaces any previous build; a running `ta` process keeps serving the
//! index it loaded until restarted.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use tds_ta_core::embedding::Embedder;
use tds_ta_core::index::EmbeddingIndex;
use tds_ta_core::models::Document;

use crate::artifacts;
use crate::config::Config;
use crate::embedding;
use crate::progress::{BuildProgressEvent, BuildProgressReporter, ProgressMode};

/// Read a document file produced by `ta process`.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse documents: {}", path.display()))
}

/// Embed `documents` and build an index, reporting progress per batch.
pub fn build_index(
    embedder: Arc<dyn Embedder>,
    documents: Vec<Document>,
    batch_size: usize,
    reporter: &dyn BuildProgressReporter,
) -> Result<EmbeddingIndex> {
    reporter.report(BuildProgressEvent::Loading {
        model: embedder.model_name().to_string(),
    });
    let index = EmbeddingIndex::build_batched(embedder, documents, batch_size, |n, total| {
        reporter.report(BuildProgressEvent::Embedding {
            n: n as u64,
            total: total as u64,
        })
    })?;
    Ok(index)
}

pub fn run_build(
    config: &Config,
    docs: Option<PathBuf>,
    batch_size_override: Option<usize>,
    progress: ProgressMode,
) -> Result<()> {
    if !config.embedding.is_enabled() {
        bail!("Embedding provider is disabled. Set [embedding] provider in config.");
    }

    let docs_file = docs.unwrap_or_else(|| config.corpus.processed.clone());
    let batch_size = batch_size_override.unwrap_or(config.embedding.batch_size);
    if batch_size == 0 {
        bail!("--batch-size must be >= 1");
    }

    let documents = load_documents(&docs_file)?;
    let provider = embedding::create_provider(&config.embedding)?;
    let reporter = progress.reporter();

    info!(
        documents = documents.len(),
        model = provider.model_name(),
        batch_size,
        "building index"
    );
    let index = build_index(provider, documents, batch_size, reporter.as_ref())?;

    reporter.report(BuildProgressEvent::Saving {
        documents: index.len() as u64,
    });
    artifacts::save(&index, &config.index.path)?;

    println!("build");
    println!("  documents: {}", index.len());
    println!("  dims: {}", index.dims());
    println!("  model: {}", index.model_name());
    println!("  index: {}", artifacts::index_path(&config.index.path).display());
    println!("  docs: {}", artifacts::docs_path(&config.index.path).display());
    Ok(())
}
