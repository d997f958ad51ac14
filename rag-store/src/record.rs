//! Core data models used by the library.

use serde::{Deserialize, Serialize};

/// A document as ingested and as stored in the point payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub title: String,
    pub text: String,
    pub category: String,
}

impl Document {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            category: category.into(),
        }
    }
}

/// A point written to the vector store: stable id, embedding and payload.
#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddedPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Document,
}

/// A single ranked hit returned by the query pipeline.
///
/// For cosine and dot collections a higher `score` means more similar; for
/// euclid collections `score` is a distance and lower is better.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub id: Option<u64>,
    pub score: f32,
    pub payload: Document,
}

/// Equality predicate on the payload's `category` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryFilter {
    pub value: String,
}

impl CategoryFilter {
    /// Payload key the predicate applies to.
    pub const FIELD: &'static str = "category";

    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Whether the document satisfies the predicate (exact, case-sensitive).
    pub fn matches(&self, doc: &Document) -> bool {
        doc.category == self.value
    }
}

/// Where a category filter is applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// The predicate is pushed into the store query and ranks the whole collection.
    #[default]
    Server,
    /// The unfiltered top-k window is fetched and filtered afterwards; may return fewer than `top_k`.
    Client,
}

/// Query parameters for retrieval.
#[derive(Clone, Debug)]
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: u64,
    pub filter: Option<CategoryFilter>,
    pub mode: FilterMode,
}

impl<'a> RagQuery<'a> {
    /// Unfiltered query with `top_k` results.
    pub fn new(text: &'a str, top_k: u64) -> Self {
        Self {
            text,
            top_k,
            filter: None,
            mode: FilterMode::Server,
        }
    }

    /// Restricts results to one category.
    pub fn category(mut self, value: impl Into<String>) -> Self {
        self.filter = Some(CategoryFilter::new(value));
        self
    }

    /// Sets an optional category, keeping `None` unfiltered.
    pub fn with_filter(mut self, filter: Option<CategoryFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Outcome of one ingestion run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Documents received.
    pub documents: usize,
    /// Points acknowledged by the store.
    pub upserted: usize,
    /// Upsert requests sent.
    pub batches: usize,
    /// Whether this run created the collection.
    pub created_collection: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_is_exact() {
        let doc = Document::new("Qdrant Overview", "text", "database");
        assert!(CategoryFilter::new("database").matches(&doc));
        assert!(!CategoryFilter::new("Database").matches(&doc));
        assert!(!CategoryFilter::new("ai").matches(&doc));
    }

    #[test]
    fn document_payload_shape() {
        let doc = Document::new("Python RAG", "RAG combines retrieval", "ai");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Python RAG",
                "text": "RAG combines retrieval",
                "category": "ai"
            })
        );
    }

    #[test]
    fn query_builder_defaults_to_server_mode() {
        let q = RagQuery::new("vector db", 3).category("database");
        assert_eq!(q.mode, FilterMode::Server);
        assert_eq!(q.filter, Some(CategoryFilter::new("database")));

        let q = q.mode(FilterMode::Client).with_filter(None);
        assert_eq!(q.mode, FilterMode::Client);
        assert!(q.filter.is_none());
    }
}
