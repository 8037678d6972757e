//! Index statistics.
//!
//! `ta stats` loads the index the same way the serving path does and prints
//! a summary: what was embedded, with which model, and how many documents
//! carry provenance and dates.

use anyhow::Result;
use std::collections::BTreeMap;

use tds_ta_core::models::Document;

use crate::artifacts;
use crate::config::Config;
use crate::service::RetrievalService;

/// Counts derived from the document list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub documents: usize,
    pub with_source: usize,
    pub dated: usize,
    pub total_chars: usize,
    /// Documents per year of their extracted date.
    pub by_year: BTreeMap<i32, usize>,
}

impl CorpusStats {
    pub fn from_documents(documents: &[Document]) -> Self {
        use chrono::Datelike;

        let mut stats = CorpusStats {
            documents: documents.len(),
            ..Default::default()
        };
        for doc in documents {
            stats.total_chars += doc.length;
            if doc.has_known_source() {
                stats.with_source += 1;
            }
            if let Some(date) = doc.date {
                stats.dated += 1;
                *stats.by_year.entry(date.year()).or_default() += 1;
            }
        }
        stats
    }
}

pub fn run_stats(config: &Config) -> Result<()> {
    let service = RetrievalService::initialize(config)?;
    let index = service.index();
    let stats = CorpusStats::from_documents(index.documents());

    let index_file = artifacts::index_path(&config.index.path);
    let size = std::fs::metadata(&index_file).map(|m| m.len()).unwrap_or(0);

    println!("TDS Virtual TA Index Stats");
    println!("==========================");
    println!();
    println!("  Index:       {}", index_file.display());
    println!("  Size:        {}", format_bytes(size));
    println!("  Model:       {}", index.model_name());
    println!("  Structure:   {}", index.structure().kind());
    println!("  Dimensions:  {}", index.dims());
    println!();
    println!("  Documents:   {}", stats.documents);
    println!("  With source: {}", stats.with_source);
    println!("  Dated:       {}", stats.dated);
    println!("  Undated:     {}", stats.documents - stats.dated);
    if stats.documents > 0 {
        println!("  Avg length:  {} chars", stats.total_chars / stats.documents);
    }

    if !stats.by_year.is_empty() {
        println!();
        println!("  By year:");
        for (year, count) in &stats.by_year {
            println!("  {:<8} {:>6}", year, count);
        }
    }
    println!();
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
