//! Embedding backend for the document search workspace.
//!
//! - [`config`]: model/endpoint configuration, loaded from environment variables.
//! - [`services::ollama_service`]: HTTP client for the Ollama embeddings API.
//! - [`error_handler`]: unified [`EmbeddingServiceError`] and env helpers.
//! - [`telemetry`]: a `tracing` layer that renders only this crate's events.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::default_config::config_ollama_embedding;
pub use config::embedding_model_config::EmbeddingModelConfig;
pub use config::embedding_provider::EmbeddingProvider;
pub use error_handler::{ConfigError, EmbeddingServiceError};
pub use services::ollama_service::OllamaService;
