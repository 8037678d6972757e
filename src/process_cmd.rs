//! `ta process`: raw corpus → structured document file.
//!
//! Reads the scraper's output (documents separated by `---` lines), segments
//! it, and writes the resulting documents as a pretty-printed JSON array.
//! This is the first half of the offline pipeline; `ta build` consumes its
//! output.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use tds_ta_core::models::Document;
use tds_ta_core::normalize::DateFallthrough;
use tds_ta_core::segment::segment_with;

use crate::config::Config;

/// Segment `input` and write the documents to `output`.
///
/// Returns the documents written. Creates `output`'s parent directory.
pub fn process_file(
    input: &Path,
    output: &Path,
    fallthrough: DateFallthrough,
) -> Result<Vec<Document>> {
    let corpus = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read corpus: {}", input.display()))?;

    let documents = segment_with(&corpus, fallthrough);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&documents)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write documents: {}", output.display()))?;

    let dated = documents.iter().filter(|d| d.date.is_some()).count();
    info!(
        documents = documents.len(),
        dated,
        output = %output.display(),
        "segmented corpus"
    );
    Ok(documents)
}

pub fn run_process(config: &Config, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let input = input.unwrap_or_else(|| config.corpus.input.clone());
    let output = output.unwrap_or_else(|| config.corpus.processed.clone());

    let documents = process_file(&input, &output, config.corpus.date_fallthrough)?;

    println!(
        "Processed {} documents saved to {}",
        documents.len(),
        output.display()
    );
    Ok(())
}
