//! Lightweight Ollama client for embeddings.
//!
//! Calls `POST {endpoint}/api/embeddings` with `{ model, prompt }` and returns
//! the `embedding` array. It uses [`EmbeddingModelConfig`] with
//! [`EmbeddingProvider::Ollama`](crate::EmbeddingProvider::Ollama).
//!
//! # Examples
//!
//! ```no_run
//! use embedding_service::{EmbeddingModelConfig, EmbeddingProvider, OllamaService};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = EmbeddingModelConfig {
//!     provider: EmbeddingProvider::Ollama,
//!     model: "all-minilm".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     timeout_secs: Some(30),
//! };
//!
//! let svc = OllamaService::new(cfg)?;
//! let vec = svc.embeddings("Ferris is a friendly crab.").await?;
//! println!("Embeddings dimension = {}", vec.len());
//! # Ok(()) }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::embedding_model_config::EmbeddingModelConfig;
use crate::error_handler::{
    ConfigError, EmbeddingServiceError, Result, make_snippet, validate_http_endpoint,
};

/// Thin client for the Ollama embeddings endpoint.
///
/// Reuses one HTTP client with the configured timeout.
pub struct OllamaService {
    client: reqwest::Client,
    cfg: EmbeddingModelConfig,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidFormat`] if `cfg.endpoint` is not an http(s) URL
    /// - [`ConfigError::EmptyModel`] if `cfg.model` is blank
    /// - [`EmbeddingServiceError::Transport`] if the HTTP client cannot be built
    pub fn new(cfg: EmbeddingModelConfig) -> Result<Self> {
        if cfg.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }

        let endpoint = cfg.endpoint.trim();
        validate_http_endpoint("OLLAMA_URL", endpoint)?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .brotli(true)
            .build()?;

        let url_embeddings = format!("{}/api/embeddings", endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            cfg,
            url_embeddings,
        })
    }

    /// Model identifier this client sends with every request.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    /// Full URL of the embeddings endpoint.
    pub fn url(&self) -> &str {
        &self.url_embeddings
    }

    /// Retrieves one embedding vector via `/api/embeddings`.
    ///
    /// # Errors
    /// - [`EmbeddingServiceError::HttpStatus`] for non-2xx responses
    /// - [`EmbeddingServiceError::Transport`] for client errors
    /// - [`EmbeddingServiceError::Decode`] if the response cannot be parsed or is empty
    #[instrument(skip_all, fields(model = %self.cfg.model, chars = input.len()))]
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>> {
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!("POST {}", self.url_embeddings);
        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_embeddings.clone();
            let text = resp.text().await.unwrap_or_default();
            return Err(EmbeddingServiceError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&text),
            });
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            EmbeddingServiceError::Decode(format!(
                "serde error: {e}; expected `{{ embedding: number[] }}`"
            ))
        })?;

        if out.embedding.is_empty() {
            return Err(EmbeddingServiceError::Decode(format!(
                "model `{}` returned an empty embedding",
                self.cfg.model
            )));
        }

        Ok(out.embedding)
    }
}

/// Request body for `/api/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response body for `/api/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::embedding_provider::EmbeddingProvider;

    fn cfg(endpoint: &str, model: &str) -> EmbeddingModelConfig {
        EmbeddingModelConfig {
            provider: EmbeddingProvider::Ollama,
            model: model.into(),
            endpoint: endpoint.into(),
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn builds_embeddings_url_without_double_slash() {
        let svc = OllamaService::new(cfg("http://localhost:11434/", "all-minilm")).unwrap();
        assert_eq!(svc.url(), "http://localhost:11434/api/embeddings");
        assert_eq!(svc.model(), "all-minilm");
    }

    #[test]
    fn rejects_bad_endpoint_and_blank_model() {
        assert!(matches!(
            OllamaService::new(cfg("localhost:11434", "all-minilm")),
            Err(EmbeddingServiceError::Config(ConfigError::InvalidFormat { .. }))
        ));
        assert!(matches!(
            OllamaService::new(cfg("http://localhost:11434", "  ")),
            Err(EmbeddingServiceError::Config(ConfigError::EmptyModel))
        ));
    }

    #[test]
    fn request_uses_prompt_field() {
        let body = EmbeddingsRequest {
            model: "all-minilm",
            prompt: "hello",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "all-minilm");
        assert_eq!(json["prompt"], "hello");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Port 9 (discard) is closed on any sane test host.
        let svc = OllamaService::new(cfg("http://127.0.0.1:9", "all-minilm")).unwrap();
        let err = svc.embeddings("text").await.unwrap_err();
        assert!(matches!(err, EmbeddingServiceError::Transport(_)));
    }
}
