//! Plain-text rendering of search results.

use crate::query_parser::ParsedQuery;
use crate::record::SearchResult;

/// Unfiltered demo listing: one line per hit with score and category.
pub fn semantic_block(query: &str, results: &[SearchResult]) -> String {
    let mut out = format!("\nSearch Results for: '{query}'\n");
    for r in results {
        out.push_str(&format!(
            "- {} | score={:.4} | category={}\n",
            r.payload.title, r.score, r.payload.category
        ));
    }
    out
}

/// Filtered demo listing; the category is in the header, not on each line.
pub fn filtered_block(query: &str, category: &str, results: &[SearchResult]) -> String {
    let mut out = format!("\nFiltered Search ({category}) for: '{query}'\n");
    for r in results {
        out.push_str(&format!("- {} | score={:.4}\n", r.payload.title, r.score));
    }
    out
}

/// Detailed listing used by the interactive session.
pub fn interactive_block(parsed: &ParsedQuery, results: &[SearchResult]) -> String {
    let mut out = format!("\nSearch Results for: '{}'\n", parsed.query_text);
    match &parsed.category_filter {
        Some(c) => out.push_str(&format!("(Filtered by category: {c})\n\n")),
        None => out.push('\n'),
    }

    if results.is_empty() {
        out.push_str("No matching results found.\n\n");
        return out;
    }

    for r in results {
        out.push_str(&format!(
            "- {}\n  Text: {}\n  Category: {}\n  Score: {:.4}\n\n",
            r.payload.title, r.payload.text, r.payload.category, r.score
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Document;

    fn hit(title: &str, category: &str, score: f32) -> SearchResult {
        SearchResult {
            id: Some(0),
            score,
            payload: Document::new(title, format!("about {title}"), category),
        }
    }

    #[test]
    fn semantic_lines() {
        let s = semantic_block(
            "What is a vector database?",
            &[hit("Vector Databases", "database", 0.81234), hit("Python RAG", "ai", 0.1)],
        );
        assert_eq!(
            s,
            "\nSearch Results for: 'What is a vector database?'\n\
             - Vector Databases | score=0.8123 | category=database\n\
             - Python RAG | score=0.1000 | category=ai\n"
        );
    }

    #[test]
    fn filtered_lines_omit_category() {
        let s = filtered_block("semantic search", "database", &[hit("Qdrant Overview", "database", 0.5)]);
        assert_eq!(
            s,
            "\nFiltered Search (database) for: 'semantic search'\n- Qdrant Overview | score=0.5000\n"
        );
    }

    #[test]
    fn interactive_with_filter_and_hits() {
        let parsed = ParsedQuery {
            query_text: "qdrant".into(),
            category_filter: Some("database".into()),
        };
        let s = interactive_block(&parsed, &[hit("Qdrant Overview", "database", 0.9)]);
        assert_eq!(
            s,
            "\nSearch Results for: 'qdrant'\n(Filtered by category: database)\n\n\
             - Qdrant Overview\n  Text: about Qdrant Overview\n  Category: database\n  Score: 0.9000\n\n"
        );
    }

    #[test]
    fn interactive_without_hits() {
        let parsed = ParsedQuery {
            query_text: "nothing".into(),
            category_filter: None,
        };
        assert_eq!(
            interactive_block(&parsed, &[]),
            "\nSearch Results for: 'nothing'\n\nNo matching results found.\n\n"
        );
    }
}
