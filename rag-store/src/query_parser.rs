//! One-line query syntax: `QUERY_TEXT` or `QUERY_TEXT | category:VALUE`.

use tracing::debug;

use crate::errors::RagError;
use crate::record::CategoryFilter;

const CATEGORY_PREFIX: &str = "category:";

/// A query line split into its text and optional category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedQuery {
    pub query_text: String,
    /// Lower-cased filter value, if a `category:` filter was given.
    pub category_filter: Option<String>,
}

impl ParsedQuery {
    pub fn filter(&self) -> Option<CategoryFilter> {
        self.category_filter.as_deref().map(CategoryFilter::new)
    }
}

/// Parses one input line.
///
/// - `Ok(None)`: the line is blank, which ends an interactive session.
/// - `Err(RagError::EmptyQuery)`: nothing left of the query once the filter part is removed.
/// - Only the first `|` splits; a filter part that does not start with
///   `category:` (any case) is ignored and the query runs unfiltered.
pub fn parse_line(line: &str) -> Result<Option<ParsedQuery>, RagError> {
    let input = line.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let (query_text, category_filter) = match input.split_once('|') {
        Some((query, filter)) => (query.trim(), parse_filter_part(filter)),
        None => (input, None),
    };

    if query_text.is_empty() {
        return Err(RagError::EmptyQuery);
    }

    Ok(Some(ParsedQuery {
        query_text: query_text.to_string(),
        category_filter,
    }))
}

fn parse_filter_part(part: &str) -> Option<String> {
    let part = part.trim().to_lowercase();
    let Some(value) = part.strip_prefix(CATEGORY_PREFIX) else {
        debug!("ignoring filter part '{part}'");
        return None;
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
