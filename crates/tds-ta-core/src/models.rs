//! Core data models shared by the segmenter, the index, and the service.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provenance recorded when a fragment carries no `[Source](...)` marker.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// One retrievable unit of course content.
///
/// `length` is derived from `content` and is recomputed whenever a document
/// is constructed or deserialized, so the two never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DocumentRecord")]
pub struct Document {
    /// Cleaned text body.
    pub content: String,
    /// Source URL, or [`UNKNOWN_SOURCE`].
    pub source_url: String,
    /// Best-effort publication date, serialized as `YYYY-MM-DD` or `null`.
    pub date: Option<NaiveDate>,
    /// Character count of `content`.
    pub length: usize,
}

impl Document {
    pub fn new(
        content: impl Into<String>,
        source_url: impl Into<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        let content = content.into();
        let length = content.chars().count();
        Self {
            content,
            source_url: source_url.into(),
            date,
            length,
        }
    }

    pub fn has_known_source(&self) -> bool {
        self.source_url != UNKNOWN_SOURCE
    }
}

/// On-disk shape of a [`Document`]; `length` is accepted but not trusted.
#[derive(Deserialize)]
struct DocumentRecord {
    content: String,
    #[serde(default = "unknown_source")]
    source_url: String,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    #[allow(dead_code)]
    length: Option<usize>,
}

fn unknown_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Document::new(record.content, record.source_url, record.date)
    }
}

/// A document paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: Document,
    /// `1 / (1 + squared_distance)`, in `(0, 1]`.
    pub score: f64,
}

/// The retrieval API shape consumed by request layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub content: String,
    pub source_url: String,
    pub score: f64,
}

impl From<&ScoredDocument> for SearchHit {
    fn from(scored: &ScoredDocument) -> Self {
        Self {
            content: scored.document.content.clone(),
            source_url: scored.document.source_url.clone(),
            score: scored.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_characters_not_bytes() {
        let doc = Document::new("héllo wörld", UNKNOWN_SOURCE, None);
        assert_eq!(doc.length, 11);
    }

    #[test]
    fn serializes_date_as_iso_or_null() {
        let dated = Document::new("a", "http://x", NaiveDate::from_ymd_opt(2025, 4, 15));
        let json = serde_json::to_value(&dated).unwrap();
        assert_eq!(json["date"], "2025-04-15");
        assert_eq!(json["length"], 1);

        let undated = Document::new("a", "http://x", None);
        let json = serde_json::to_value(&undated).unwrap();
        assert!(json["date"].is_null());
    }

    #[test]
    fn deserialize_recomputes_stale_length() {
        let doc: Document = serde_json::from_str(
            r#"{"content": "abc", "source_url": "Unknown", "date": null, "length": 99}"#,
        )
        .unwrap();
        assert_eq!(doc.length, 3);
        assert!(!doc.has_known_source());
    }

    #[test]
    fn deserialize_tolerates_missing_optional_fields() {
        let doc: Document = serde_json::from_str(r#"{"content": "abc"}"#).unwrap();
        assert_eq!(doc.source_url, UNKNOWN_SOURCE);
        assert_eq!(doc.date, None);
    }
}
