//! Document sources: the built-in demo set and a strict JSONL reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::RagError;
use crate::record::Document;

/// The three-document demo corpus.
///
/// Categories are lower-case because interactive filters are lower-cased
/// before matching.
pub fn sample_documents() -> Vec<Document> {
    vec![
        Document::new(
            "Vector Databases",
            "Vector databases store embeddings of text for semantic search.",
            "database",
        ),
        Document::new(
            "Python RAG",
            "RAG combines retrieval and generation using language models.",
            "ai",
        ),
        Document::new(
            "Qdrant Overview",
            "Qdrant is a vector database optimized for embeddings.",
            "database",
        ),
    ]
}

/// Row shape expected on each JSONL line; unknown fields are rejected.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentRow {
    title: String,
    text: String,
    category: String,
}

/// Reads documents from JSONL strictly, one `{title, text, category}` object per line.
///
/// - Empty lines are skipped.
/// - Input order is kept; it determines point ids at ingestion.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be read.
/// - [`RagError::Parse`] naming the first malformed line.
pub fn read_documents_jsonl(jsonl_path: impl AsRef<Path>) -> Result<Vec<Document>, RagError> {
    info!("Reading documents JSONL: {:?}", jsonl_path.as_ref());

    let file = File::open(jsonl_path.as_ref())?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let row: DocumentRow = serde_json::from_str(&line)
            .map_err(|e| RagError::Parse(format!("line {} parse error: {}", i + 1, e)))?;

        if row.category.chars().any(char::is_uppercase) {
            warn!(
                "line {}: category '{}' has upper-case letters; lower-cased interactive filters will not match it",
                i + 1,
                row.category
            );
        }

        out.push(Document {
            title: row.title,
            text: row.text,
            category: row.category,
        });
    }

    debug!("Loaded {} documents", out.len());
    Ok(out)
}
