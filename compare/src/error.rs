//! Error types for comparison sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use textsim_embeddings::EmbeddingError;
use thiserror::Error;

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, ComparisonError>;

/// Which of the two compared texts an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    /// Text entered by the user.
    User,
    /// Reference text the user's text is compared against.
    Expected,
}

impl fmt::Display for TextRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Expected => f.write_str("expected"),
        }
    }
}

/// Errors that can occur while loading a model or running a comparison.
#[derive(Error, Debug)]
pub enum ComparisonError {
    /// The model failed to initialize. Fatal for the session.
    #[error("embedding model failed to load: {0}")]
    ModelLoad(String),

    /// The model has not finished loading.
    #[error("embedding model is not ready")]
    ModelNotReady,

    /// A single embed call failed.
    #[error("embedding the {input} text failed: {source}")]
    ModelInvocation {
        input: TextRole,
        #[source]
        source: EmbeddingError,
    },

    /// The model output for one text could not be reduced to a vector.
    #[error("could not normalize output for the {input} text: {source}")]
    Normalization {
        input: TextRole,
        #[source]
        source: EmbeddingError,
    },

    /// Scoring the two vectors failed.
    #[error("similarity could not be computed: {0}")]
    Similarity(#[source] EmbeddingError),

    /// One of the texts is empty.
    #[error("both texts must be non-empty")]
    EmptyInput,

    /// Another comparison is still running on this session.
    #[error("a comparison is already in progress")]
    Busy,

    /// Embedding error outside a specific comparison stage.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a failure, as shown to the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ModelLoad,
    ModelInvocation,
    UnsupportedOutputFormat,
    UndefinedSimilarity,
    Comparison,
}

impl ComparisonError {
    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ModelLoad(_) => FailureKind::ModelLoad,
            Self::ModelInvocation { .. } => FailureKind::ModelInvocation,
            Self::Normalization {
                source: EmbeddingError::UnsupportedOutputFormat(_),
                ..
            } => FailureKind::UnsupportedOutputFormat,
            Self::Similarity(EmbeddingError::UndefinedSimilarity) => {
                FailureKind::UndefinedSimilarity
            }
            _ => FailureKind::Comparison,
        }
    }

    /// Whether the session can no longer run comparisons.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ModelLoad(_))
    }

    /// The single message surfaced to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::ModelLoad(reason) => {
                format!("The embedding model could not be loaded: {reason}")
            }
            Self::ModelNotReady => "The embedding model is still loading.".to_string(),
            Self::EmptyInput => "Enter both texts to compare.".to_string(),
            Self::Busy => "A comparison is already running.".to_string(),
            Self::Similarity(EmbeddingError::UndefinedSimilarity) => {
                "Similarity is undefined because one of the texts produced an all-zero embedding."
                    .to_string()
            }
            Self::Config(reason) => format!("Invalid configuration: {reason}"),
            other => format!("Comparison failed: {other}"),
        }
    }
}
