//! Build progress reporting.
//!
//! `ta build` embeds the whole corpus, which can take minutes with a real
//! model. Progress is emitted on **stderr** so stdout stays parseable for
//! scripts.

use std::io::{IsTerminal, Write};

/// A single progress event for an index build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildProgressEvent {
    /// The embedding model is being prepared (may include a download).
    Loading { model: String },
    /// `n` of `total` documents embedded.
    Embedding { n: u64, total: u64 },
    /// The artifact pair is being written.
    Saving { documents: u64 },
}

/// Reports build progress. Implementations write to stderr (human or JSON).
pub trait BuildProgressReporter: Send + Sync {
    fn report(&self, event: BuildProgressEvent);
}

/// Human-friendly progress on stderr: "build  embedding  1,234 / 5,000 documents".
pub struct StderrProgress;

impl BuildProgressReporter for StderrProgress {
    fn report(&self, event: BuildProgressEvent) {
        let line = match &event {
            BuildProgressEvent::Loading { model } => format!("build  loading model {}\n", model),
            BuildProgressEvent::Embedding { n, total } => format!(
                "build  embedding  {} / {} documents\n",
                format_number(*n),
                format_number(*total)
            ),
            BuildProgressEvent::Saving { documents } => {
                format!("build  saving {} documents\n", format_number(*documents))
            }
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl BuildProgressReporter for JsonProgress {
    fn report(&self, event: BuildProgressEvent) {
        let obj = match &event {
            BuildProgressEvent::Loading { model } => serde_json::json!({
                "event": "progress",
                "phase": "loading",
                "model": model
            }),
            BuildProgressEvent::Embedding { n, total } => serde_json::json!({
                "event": "progress",
                "phase": "embedding",
                "n": n,
                "total": total
            }),
            BuildProgressEvent::Saving { documents } => serde_json::json!({
                "event": "progress",
                "phase": "saving",
                "documents": documents
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }
}

pub struct NoProgress;

impl BuildProgressReporter for NoProgress {
    fn report(&self, _event: BuildProgressEvent) {}
}

pub(crate) fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Human progress when stderr is a terminal, otherwise off.
    pub fn default_for_tty() -> Self {
        if std::io::stderr().is_terminal() {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    pub fn reporter(&self) -> Box<dyn BuildProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn reporter_for_each_mode() {
        for mode in [ProgressMode::Off, ProgressMode::Human, ProgressMode::Json] {
            mode.reporter()
                .report(BuildProgressEvent::Embedding { n: 1, total: 2 });
        }
    }
}
