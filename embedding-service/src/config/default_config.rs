//! Default embedding configs loaded from environment variables.
//!
//! # Environment variables
//!
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (one of them is mandatory)
//! - `EMBEDDING_MODEL`             = embedding model (default `all-minilm`)
//! - `EMBEDDING_TIMEOUT_SECS`      = request timeout (default 30)

use crate::{
    config::{embedding_model_config::EmbeddingModelConfig, embedding_provider::EmbeddingProvider},
    error_handler::{ConfigError, EmbeddingServiceError, env_opt_u64, validate_http_endpoint},
};

/// Model used when `EMBEDDING_MODEL` is unset: Ollama's build of all-MiniLM-L6-v2 (384 dims).
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
/// - [`ConfigError::InvalidFormat`] if `OLLAMA_URL` has no http(s) scheme
fn ollama_endpoint() -> Result<String, EmbeddingServiceError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            let url = url.trim().to_string();
            validate_http_endpoint("OLLAMA_URL", &url)?;
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{port}"));
        }
    }
    Err(EmbeddingServiceError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Constructs a config for the **embedding** Ollama model.
///
/// # Env
/// - `EMBEDDING_MODEL` (optional, default [`DEFAULT_EMBEDDING_MODEL`])
/// - `EMBEDDING_TIMEOUT_SECS` (optional, default 30)
pub fn config_ollama_embedding() -> Result<EmbeddingModelConfig, EmbeddingServiceError> {
    let endpoint = ollama_endpoint()?;
    let model = std::env::var("EMBEDDING_MODEL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
    let timeout_secs = env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.or(Some(30));

    Ok(EmbeddingModelConfig {
        provider: EmbeddingProvider::Ollama,
        model,
        endpoint,
        timeout_secs,
    })
}
