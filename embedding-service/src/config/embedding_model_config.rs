use crate::config::embedding_provider::EmbeddingProvider;

/// Configuration for one embedding model invocation.
///
/// # Fields
///
/// - `provider`: which backend serves the model.
/// - `model`: model identifier (e.g. `"all-minilm"`, `"nomic-embed-text"`).
/// - `endpoint`: base URL of the runtime, without the API path.
/// - `timeout_secs`: optional request timeout in seconds.
///
/// # Examples
///
/// ```
/// use embedding_service::{EmbeddingModelConfig, EmbeddingProvider};
///
/// let cfg = EmbeddingModelConfig {
///     provider: EmbeddingProvider::Ollama,
///     model: "all-minilm".to_string(),
///     endpoint: "http://localhost:11434".to_string(),
///     timeout_secs: Some(30),
/// };
/// assert_eq!(cfg.provider, EmbeddingProvider::Ollama);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingModelConfig {
    /// The embedding backend.
    pub provider: EmbeddingProvider,

    /// Model identifier string.
    pub model: String,

    /// Runtime base URL (e.g. `http://localhost:11434`).
    pub endpoint: String,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
