//! # TDS Virtual TA CLI (`ta`)
//!
//! ## Usage
//!
//! ```bash
//! ta --config ./config/ta.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ta process` | Segment the raw corpus into a JSON document file |
//! | `ta build` | Embed documents and save the index artifact pair |
//! | `ta search "<query>"` | Print the most relevant documents |
//! | `ta ask "<question>"` | Print `{answer, links}` JSON for a question |
//! | `ta stats` | Summarize the built index |
//! | `ta eval <cases.toml>` | Check answers against expected keywords |

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tds_ta::config::{self, Config};
use tds_ta::progress::ProgressMode;
use tds_ta::{build_cmd, eval_cmd, logging, process_cmd, search, stats};

const DEFAULT_CONFIG: &str = "./config/ta.toml";

/// TDS Virtual TA: retrieval-augmented answers over course material.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ta.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ta",
    about = "TDS Virtual TA: retrieval-augmented answers over course material",
    version
)]
struct Cli {
    /// Path to configuration file (TOML) [default: ./config/ta.toml].
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment the raw corpus into structured documents.
    ///
    /// Runs without a config file; paths then default to `./data/`.
    Process {
        /// Raw corpus file (documents separated by `---` lines).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Where to write the JSON document array.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Embed documents and save the index artifact pair.
    Build {
        /// JSON document file produced by `ta process`.
        #[arg(long)]
        docs: Option<PathBuf>,

        /// Documents per embedding call (overrides config).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Progress output on stderr. Defaults to human on a TTY, off otherwise.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Print the documents most relevant to a query.
    Search {
        query: String,

        /// Number of results (defaults to retrieval.top_k).
        #[arg(long)]
        k: Option<usize>,

        /// Print `[{content, source_url, score}]` JSON.
        #[arg(long)]
        json: bool,
    },

    /// Answer a question from the retrieved course material.
    Ask {
        question: String,

        /// Number of context documents (defaults to retrieval.top_k).
        #[arg(long)]
        k: Option<usize>,
    },

    /// Summarize the built index.
    Stats,

    /// Run keyword checks from a TOML case file.
    Eval { cases: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    // Only `process` may run without a file, and only when --config is not given.
    let explicit_config = cli.config.is_some();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let load = || config::load_config(&config_path);

    match cli.command {
        Commands::Process { input, output } => {
            let cfg = if explicit_config || config_path.exists() {
                load()?
            } else {
                Config::minimal()
            };
            process_cmd::run_process(&cfg, input, output)?;
        }
        Commands::Build {
            docs,
            batch_size,
            progress,
        } => {
            let mode = progress.unwrap_or_else(ProgressMode::default_for_tty);
            build_cmd::run_build(&load()?, docs, batch_size, mode)?;
        }
        Commands::Search { query, k, json } => {
            search::run_search(&load()?, &query, k, json)?;
        }
        Commands::Ask { question, k } => {
            search::run_ask(&load()?, &question, k)?;
        }
        Commands::Stats => {
            stats::run_stats(&load()?)?;
        }
        Commands::Eval { cases } => {
            eval_cmd::run_eval(&load()?, &cases)?;
        }
    }

    Ok(())
}
