//! Error types for the embeddings pipeline.

use thiserror::Error;

/// Result type alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors that can occur while producing, normalizing or scoring embeddings.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// The model output matched none of the recognized shapes.
    #[error("unsupported model output format: {0}")]
    UnsupportedOutputFormat(String),

    /// Pooling was asked to average zero observations.
    #[error("cannot pool an empty set of vectors")]
    EmptyPool,

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// One of the vectors has zero magnitude, so the angle is undefined.
    #[error("cosine similarity is undefined for a zero-magnitude vector")]
    UndefinedSimilarity,

    /// API request failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// Rate limit exceeded.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Invalid response from the model runtime.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
