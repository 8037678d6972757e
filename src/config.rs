//! TOML configuration.
//!
//! Only `[index]` is required; every other section falls back to defaults.
//! See `config/ta.example.toml` for a complete file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tds_ta_core::normalize::DateFallthrough;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub index: IndexConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
}

/// Location of the persisted artifact pair.
#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Shared prefix: `<path>.index` and `<path>.docs.json`.
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_input")]
    pub input: PathBuf,
    #[serde(default = "default_corpus_processed")]
    pub processed: PathBuf,
    #[serde(default)]
    pub date_fallthrough: DateFallthrough,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            input: default_corpus_input(),
            processed: default_corpus_processed(),
            date_fallthrough: DateFallthrough::default(),
        }
    }
}

fn default_corpus_input() -> PathBuf {
    PathBuf::from("./data/extracted_contents.doc")
}
fn default_corpus_processed() -> PathBuf {
    PathBuf::from("./data/processed_data.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            url: None,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnswerConfig {
    #[serde(default = "default_answer_provider")]
    pub provider: String,
    #[serde(default = "default_answer_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
    #[serde(default = "default_link_text_chars")]
    pub link_text_chars: usize,
    #[serde(default = "default_answer_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_answer_max_retries")]
    pub max_retries: u32,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            provider: default_answer_provider(),
            model: default_answer_model(),
            temperature: default_temperature(),
            max_context_chars: default_max_context_chars(),
            link_text_chars: default_link_text_chars(),
            timeout_secs: default_answer_timeout_secs(),
            max_retries: default_answer_max_retries(),
        }
    }
}

fn default_answer_provider() -> String {
    "excerpt".to_string()
}
fn default_answer_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_context_chars() -> usize {
    2000
}
fn default_link_text_chars() -> usize {
    100
}
fn default_answer_timeout_secs() -> u64 {
    60
}
fn default_answer_max_retries() -> u32 {
    3
}

impl Config {
    /// Defaults for commands that can run without a config file.
    pub fn minimal() -> Self {
        Self {
            index: IndexConfig {
                path: PathBuf::from("./data/tds_vector_db"),
            },
            corpus: CorpusConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            answer: AnswerConfig::default(),
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.index.path.as_os_str().is_empty() {
            anyhow::bail!("index.path must not be empty");
        }

        if self.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be >= 1");
        }

        if self.embedding.batch_size == 0 {
            anyhow::bail!("embedding.batch_size must be >= 1");
        }

        match self.embedding.provider.as_str() {
            "disabled" | "hashed" | "local" => {}
            "openai" | "ollama" => {
                if self.embedding.dims.is_none() || self.embedding.dims == Some(0) {
                    anyhow::bail!(
                        "embedding.dims must be > 0 when provider is '{}'",
                        self.embedding.provider
                    );
                }
                if self.embedding.model.is_none() {
                    anyhow::bail!(
                        "embedding.model must be specified when provider is '{}'",
                        self.embedding.provider
                    );
                }
            }
            other => anyhow::bail!(
                "Unknown embedding provider: '{}'. Must be disabled, hashed, local, openai, or ollama.",
                other
            ),
        }

        if self.embedding.dims == Some(0) {
            anyhow::bail!("embedding.dims must be > 0");
        }

        match self.answer.provider.as_str() {
            "excerpt" | "openai" => {}
            other => anyhow::bail!(
                "Unknown answer provider: '{}'. Must be excerpt or openai.",
                other
            ),
        }

        if self.answer.max_context_chars == 0 {
            anyhow::bail!("answer.max_context_chars must be >= 1");
        }

        if !(0.0..=2.0).contains(&self.answer.temperature) {
            anyhow::bail!("answer.temperature must be in [0.0, 2.0]");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}
