//! Corpus segmenter.
//!
//! Splits a raw scraped corpus into [`Document`]s. The scraper writes one
//! page or post per fragment, separated by `---`, and tags each fragment
//! with an inline `[Source](<url>)` marker.
//!
//! # Algorithm
//!
//! 1. Split the corpus on the literal [`SEPARATOR`].
//! 2. Trim each fragment and drop the whitespace-only ones.
//! 3. Capture the URL of the first source marker (or [`UNKNOWN_SOURCE`]) and
//!    delete every marker from the fragment.
//! 4. [`clean`] what remains.
//! 5. Take the date from the cleaned content, falling back to the URL.
//!
//! Fragment order becomes document order, which fixes each document's
//! ordinal in the index.
//!
//! # Example
//!
//! ```rust
//! use tds_ta_core::segment::segment;
//!
//! let docs = segment("A text [Source](http://x)\n\n---\n\nB text");
//! assert_eq!(docs.len(), 2);
//! assert_eq!(docs[0].content, "A text");
//! assert_eq!(docs[0].source_url, "http://x");
//! assert_eq!(docs[1].source_url, "Unknown");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Document, UNKNOWN_SOURCE};
use crate::normalize::{clean, extract_date_with, DateFallthrough};

/// Fragment separator written by the scraper between documents.
pub const SEPARATOR: &str = "---";

static SOURCE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Source\]\((.*?)\)").expect("source marker pattern"));

/// Segment a corpus using the default date fallthrough policy.
pub fn segment(corpus: &str) -> Vec<Document> {
    segment_with(corpus, DateFallthrough::default())
}

/// Segment a corpus into documents, one per non-blank fragment.
pub fn segment_with(corpus: &str, fallthrough: DateFallthrough) -> Vec<Document> {
    corpus
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| segment_fragment(fragment, fallthrough))
        .collect()
}

fn segment_fragment(fragment: &str, fallthrough: DateFallthrough) -> Document {
    let source_url = SOURCE_MARKER
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    let body = SOURCE_MARKER.replace_all(fragment, "");
    let content = clean(&body);

    let date = extract_date_with(&content, fallthrough)
        .or_else(|| extract_date_with(&source_url, fallthrough));

    Document::new(content, source_url, date)
}
