//! # TDS Virtual TA
//!
//! A retrieval-augmented teaching assistant for the Tools in Data Science
//! course. Scraped course material is segmented into documents, embedded
//! into an exact nearest-neighbour index, and queried to ground answers.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ raw corpus   │──▶│ ta process   │──▶│ processed_data.json  │
//! └──────────────┘   └──────────────┘   └──────────┬───────────┘
//!                                                  ▼
//!                    ┌──────────────┐   ┌──────────────────────┐
//!                    │ ta build     │──▶│ <prefix>.index       │
//!                    │ (Embedder)   │   │ <prefix>.docs.json   │
//!                    └──────────────┘   └──────────┬───────────┘
//!                                                  ▼
//!                                       ┌──────────────────────┐
//!                                       │ RetrievalService     │
//!                                       │ search / ask / eval  │
//!                                       └──────────────────────┘
//! ```
//!
//! The build and serve sides share nothing but the artifact pair.
//!
//! ## Quick Start
//!
//! ```bash
//! ta process                         # segment ./data/extracted_contents.doc
//! ta build                           # embed and save the index
//! ta search "docker vs podman"
//! ta ask "How do I submit GA5?"
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`embedding`] | Embedding providers (hashed, local, OpenAI, Ollama) |
//! | [`artifacts`] | Saving and loading the artifact pair |
//! | [`service`] | The loaded, shareable retrieval service |
//! | [`answer`] | Answer synthesis and link formatting |
//! | [`process_cmd`] | `ta process` |
//! | [`build_cmd`] | `ta build` |
//! | [`search`] | `ta search` and `ta ask` |
//! | [`stats`] | `ta stats` |
//! | [`eval_cmd`] | `ta eval` |
//!
//! The engine itself lives in the `tds-ta-core` crate and is re-exported as
//! [`engine`].

pub mod answer;
pub mod artifacts;
pub mod build_cmd;
pub mod config;
pub mod embedding;
pub mod eval_cmd;
mod http;
pub mod logging;
pub mod process_cmd;
pub mod progress;
pub mod search;
pub mod service;
pub mod stats;

pub use tds_ta_core as engine;
