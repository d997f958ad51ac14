//! `doc-search` binary: composition root.
//!
//! 1. Load `.env` and set up logging
//! 2. Build the embedder (Ollama or offline hashing) and the store (Qdrant or in-memory)
//! 3. Bootstrap the collection, failing fast on a dimension mismatch
//! 4. Run the selected command

mod cli;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use rag_store::{
    CategoryFilter, Document, EmbeddingsProvider, FilterMode, HashEmbedder, InteractiveSession,
    MemoryStore, OllamaEmbedder, RagConfig, RagQuery, RagStore, filtered_block,
    read_documents_jsonl, sample_documents, semantic_block,
};
use tracing::{Level, info};
use tracing_subscriber::{Layer, filter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{CliArgs, Command, EmbedderKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; a malformed one is not.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to load .env");
        }
    }

    init_tracing()?;

    let args = CliArgs::parse();
    if let Err(e) = run(args).await {
        eprintln!("{} {e:#}", "error:".red().bold());
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = embedding_service::telemetry::env_filter_with_level("info", Level::INFO);

    let app_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(filter::filter_fn(|meta| {
            !meta
                .target()
                .starts_with(embedding_service::telemetry::TARGET_PREFIX)
        }));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(app_layer)
        .with(embedding_service::telemetry::layer())
        .try_init()
        .context("setting default subscriber failed")
}

async fn run(args: CliArgs) -> anyhow::Result<()> {
    let cfg = RagConfig::from_env().context("invalid RAG configuration")?;
    let provider = build_embedder(&args).await?;

    let rag = if args.memory {
        info!("using in-memory vector store");
        RagStore::new(cfg, Arc::new(MemoryStore::new()), provider)?
    } else {
        RagStore::with_qdrant(cfg, provider)?
    };

    let outcome = rag
        .ensure_collection()
        .await
        .with_context(|| format!("cannot use collection '{}'", rag.config().collection))?;
    info!(
        collection = %rag.config().collection,
        size = outcome.space.size,
        created = outcome.created,
        "collection ready"
    );

    match args.command {
        Command::Demo { query, category } => {
            ingest(&rag, args.docs.as_deref()).await?;
            let top_k = rag.config().top_k;

            let results = rag.search(RagQuery::new(&query, top_k)).await?;
            print!("{}", semantic_block(&query, &results));

            let results = rag
                .search(RagQuery::new(&query, top_k).category(category.as_str()))
                .await?;
            print!("{}", filtered_block(&query, &category, &results));
        }
        Command::Interactive { top_k, post_filter } => {
            ingest(&rag, args.docs.as_deref()).await?;

            let mut session = InteractiveSession::new(&rag);
            if let Some(k) = top_k {
                session = session.top_k(k);
            }
            if post_filter {
                session = session.mode(FilterMode::Client);
            }
            session.run(io::stdin().lock(), io::stdout().lock()).await?;
        }
        Command::Ingest => {
            ingest(&rag, args.docs.as_deref()).await?;
        }
        Command::Search {
            query,
            category,
            top_k,
            post_filter,
        } => {
            let mode = if post_filter {
                FilterMode::Client
            } else {
                rag.config().filter_mode
            };
            let q = RagQuery::new(&query, top_k.unwrap_or(rag.config().top_k))
                .with_filter(category.as_deref().map(CategoryFilter::new))
                .mode(mode);
            let results = rag.search(q).await?;
            match &category {
                Some(c) => print!("{}", filtered_block(&query, c, &results)),
                None => print!("{}", semantic_block(&query, &results)),
            }
        }
    }

    Ok(())
}

async fn build_embedder(args: &CliArgs) -> anyhow::Result<Arc<dyn EmbeddingsProvider>> {
    let dim = args.resolve_dim()?;
    match args.resolve_embedder()? {
        EmbedderKind::Hash => {
            let dim = dim.unwrap_or(HashEmbedder::DEFAULT_DIM);
            let embedder = HashEmbedder::try_new(dim).context("invalid embedding dimension")?;
            info!(dim, "using offline hashing embedder");
            Ok(Arc::new(embedder))
        }
        EmbedderKind::Ollama => {
            let cfg = embedding_service::config_ollama_embedding()?;
            let svc = Arc::new(embedding_service::OllamaService::new(cfg)?);
            let embedder = OllamaEmbedder::connect(svc, dim)
                .await
                .context("embedding model is not reachable")?;
            Ok(Arc::new(embedder))
        }
    }
}

async fn ingest(rag: &RagStore, docs: Option<&Path>) -> anyhow::Result<()> {
    let documents: Vec<Document> = match docs {
        Some(path) => read_documents_jsonl(path)
            .with_context(|| format!("cannot read documents from {}", path.display()))?,
        None => sample_documents(),
    };

    let report = rag.ingest(&documents).await?;
    println!(
        "{}",
        format!(
            "Ingested {} documents into '{}'",
            report.upserted,
            rag.config().collection
        )
        .green()
    );
    Ok(())
}
