//! Persistence of a built index as an artifact pair.
//!
//! A saved index with prefix `P` consists of two files:
//!
//! | File | Contents |
//! |------|----------|
//! | `P.index` | header + encoded similarity structure |
//! | `P.docs.json` | the ordered document array, pretty-printed JSON |
//!
//! # `.index` layout
//!
//! ```text
//! magic        8 bytes   "TDSTAIDX"
//! version      u32 LE    1
//! model_len    u32 LE
//! model        model_len bytes, UTF-8 embedding model name
//! docs_sha256  32 bytes  SHA-256 of the exact `.docs.json` bytes
//! structure    rest      NearestNeighbors::to_bytes()
//! ```
//!
//! The checksum ties the two halves together: a `.docs.json` from another
//! build is rejected as corrupt instead of silently mismatching vector
//! ordinals and documents. Each file is written to a temporary sibling and
//! renamed into place.

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use tds_ta_core::ann::decode_structure;
use tds_ta_core::embedding::Embedder;
use tds_ta_core::index::EmbeddingIndex;
use tds_ta_core::models::Document;
use tds_ta_core::{Result, RetrievalError};

const MAGIC: &[u8; 8] = b"TDSTAIDX";
const FORMAT_VERSION: u32 = 1;
const DIGEST_LEN: usize = 32;

/// `<prefix>.index`
pub fn index_path(prefix: &Path) -> PathBuf {
    with_suffix(prefix, ".index")
}

/// `<prefix>.docs.json`
pub fn docs_path(prefix: &Path) -> PathBuf {
    with_suffix(prefix, ".docs.json")
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut s = prefix.as_os_str().to_os_string();
    s.push(suffix);
    PathBuf::from(s)
}

/// True if either half of the pair is present.
pub fn exists(prefix: &Path) -> bool {
    index_path(prefix).exists() || docs_path(prefix).exists()
}

/// Header fields of a saved `.index` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHeader {
    pub model: String,
    pub docs_sha256: [u8; DIGEST_LEN],
}

/// Write `index` to `<prefix>.index` and `<prefix>.docs.json`.
///
/// Creates the parent directory if needed and replaces any existing pair.
pub fn save(index: &EmbeddingIndex, prefix: &Path) -> Result<()> {
    if let Some(parent) = prefix.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let docs = serde_json::to_vec_pretty(index.documents())?;
    let digest = Sha256::digest(&docs);

    let model = index.model_name().as_bytes();
    let structure = index.structure().to_bytes();
    let mut bytes = Vec::with_capacity(16 + model.len() + DIGEST_LEN + structure.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(model.len() as u32).to_le_bytes());
    bytes.extend_from_slice(model);
    bytes.extend_from_slice(digest.as_slice());
    bytes.extend_from_slice(&structure);

    write_replacing(&docs_path(prefix), &docs)?;
    write_replacing(&index_path(prefix), &bytes)?;

    debug!(
        prefix = %prefix.display(),
        documents = index.len(),
        dims = index.dims(),
        "saved index"
    );
    Ok(())
}

fn write_replacing(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Load the pair saved under `prefix`, querying it with `embedder`.
///
/// # Errors
///
/// - [`RetrievalError::MissingIndexArtifact`] if either file is absent.
/// - [`RetrievalError::CorruptIndex`] if the header is malformed, the
///   checksum does not match `.docs.json`, or the counts disagree.
/// - [`RetrievalError::DimensionMismatch`] if `embedder` produces vectors
///   of a different size than the stored ones.
///
/// A model name that differs from the one recorded at build time is only
/// logged: the caller may knowingly query with an equivalent model.
pub fn load(prefix: &Path, embedder: Arc<dyn Embedder>) -> Result<EmbeddingIndex> {
    let index_file = index_path(prefix);
    let docs_file = docs_path(prefix);
    for path in [&index_file, &docs_file] {
        if !path.exists() {
            return Err(RetrievalError::MissingIndexArtifact { path: path.clone() });
        }
    }

    let bytes = fs::read(&index_file)?;
    let docs = fs::read(&docs_file)?;

    let (header, body) = parse_header(&bytes)?;
    if Sha256::digest(&docs).as_slice() != &header.docs_sha256[..] {
        return Err(RetrievalError::corrupt(format!(
            "{} does not belong to {}",
            docs_file.display(),
            index_file.display()
        )));
    }

    if header.model != embedder.model_name() {
        warn!(
            built_with = %header.model,
            querying_with = %embedder.model_name(),
            "index was built with a different embedding model"
        );
    }

    let documents: Vec<Document> = serde_json::from_slice(&docs)
        .map_err(|e| RetrievalError::corrupt(format!("unreadable document list: {}", e)))?;
    let structure = decode_structure(body)?;

    debug!(
        prefix = %prefix.display(),
        kind = structure.kind(),
        vectors = structure.len(),
        "loaded index"
    );
    EmbeddingIndex::from_parts(embedder, structure, documents)
}

/// Read just the header of `<prefix>.index`.
pub fn read_header(prefix: &Path) -> Result<ArtifactHeader> {
    let path = index_path(prefix);
    if !path.exists() {
        return Err(RetrievalError::MissingIndexArtifact { path });
    }
    let bytes = fs::read(&path)?;
    parse_header(&bytes).map(|(header, _)| header)
}

fn parse_header(bytes: &[u8]) -> Result<(ArtifactHeader, &[u8])> {
    let truncated = || RetrievalError::corrupt("index header is truncated");

    if bytes.len() < 16 || &bytes[..8] != MAGIC {
        return Err(RetrievalError::corrupt("not a tds-ta index file"));
    }
    let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if version != FORMAT_VERSION {
        return Err(RetrievalError::corrupt(format!(
            "unsupported index version {}",
            version
        )));
    }
    let model_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;

    let rest = &bytes[16..];
    if rest.len() < model_len + DIGEST_LEN {
        return Err(truncated());
    }
    let (model, rest) = rest.split_at(model_len);
    let model = String::from_utf8(model.to_vec())
        .map_err(|_| RetrievalError::corrupt("model name is not UTF-8"))?;
    let (digest, body) = rest.split_at(DIGEST_LEN);
    let mut docs_sha256 = [0u8; DIGEST_LEN];
    docs_sha256.copy_from_slice(digest);

    Ok((ArtifactHeader { model, docs_sha256 }, body))
}
