//! CLI argument definitions for `doc-search`.
//!
//! Priority resolution: CLI args > env vars > defaults.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Semantic document search: ingest a document set, query it by meaning, filter by category.
#[derive(Parser, Debug)]
#[command(name = "doc-search", version, about)]
pub struct CliArgs {
    /// JSONL file with one `{title, text, category}` object per line (default: built-in sample set).
    #[arg(long = "docs", global = true)]
    pub docs: Option<PathBuf>,

    /// Use the in-process store instead of Qdrant.
    #[arg(long = "memory", global = true)]
    pub memory: bool,

    /// Embedding backend.
    #[arg(long = "embedder", global = true, value_enum)]
    pub embedder: Option<EmbedderKind>,

    /// Embedding dimension; discovered from the model when omitted.
    #[arg(long = "dim", global = true)]
    pub dim: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest, then run one unfiltered and one category-filtered search.
    Demo {
        /// Query used for both searches.
        #[arg(default_value = "How do vector databases work?")]
        query: String,

        /// Category for the filtered search.
        #[arg(long = "category", default_value = "database")]
        category: String,
    },

    /// Ingest, then read `query|category:value` lines until a blank line.
    Interactive {
        /// Results per query.
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<u64>,

        /// Filter the top-k window after retrieval instead of inside the store query.
        #[arg(long = "post-filter")]
        post_filter: bool,
    },

    /// Ingest the documents and exit.
    Ingest,

    /// Run one search against an already ingested collection.
    Search {
        query: String,

        /// Only return documents of this category.
        #[arg(short = 'c', long = "category")]
        category: Option<String>,

        /// Results to return.
        #[arg(short = 'k', long = "top-k")]
        top_k: Option<u64>,

        /// Filter the top-k window after retrieval instead of inside the store query.
        #[arg(long = "post-filter")]
        post_filter: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Ollama embeddings API.
    Ollama,
    /// Offline feature-hashing embedder.
    Hash,
}

impl CliArgs {
    /// Priority: --embedder flag > EMBEDDING_PROVIDER env var > ollama.
    pub fn resolve_embedder(&self) -> anyhow::Result<EmbedderKind> {
        if let Some(kind) = self.embedder {
            return Ok(kind);
        }
        match std::env::var("EMBEDDING_PROVIDER") {
            Ok(v) if !v.trim().is_empty() => EmbedderKind::from_str(v.trim(), true)
                .map_err(|_| anyhow::anyhow!("EMBEDDING_PROVIDER: unknown embedder '{v}'")),
            _ => Ok(EmbedderKind::Ollama),
        }
    }

    /// Priority: --dim flag > EMBEDDING_DIM env var > none.
    pub fn resolve_dim(&self) -> anyhow::Result<Option<usize>> {
        if let Some(d) = self.dim {
            return Ok(Some(d));
        }
        match std::env::var("EMBEDDING_DIM") {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<usize>()
                .map(Some)
                .map_err(|_| anyhow::anyhow!("EMBEDDING_DIM: expected a positive integer, got '{v}'")),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_flags_parse() {
        let args = CliArgs::parse_from([
            "doc-search",
            "--memory",
            "search",
            "vector db",
            "--category",
            "database",
            "-k",
            "5",
            "--post-filter",
        ]);
        assert!(args.memory);
        match args.command {
            Command::Search {
                query,
                category,
                top_k,
                post_filter,
            } => {
                assert_eq!(query, "vector db");
                assert_eq!(category.as_deref(), Some("database"));
                assert_eq!(top_k, Some(5));
                assert!(post_filter);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["doc-search", "demo", "--embedder", "hash", "--dim", "64"]);
        assert_eq!(args.embedder, Some(EmbedderKind::Hash));
        assert_eq!(args.dim, Some(64));
        assert_eq!(args.resolve_embedder().unwrap(), EmbedderKind::Hash);
        assert!(matches!(args.command, Command::Demo { .. }));
    }
}
