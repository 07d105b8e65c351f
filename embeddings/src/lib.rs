//! # Embeddings
//!
//! This crate turns raw sentence-embedding model output into comparable
//! vectors and scores them.
//!
//! ## Features
//!
//! - **Output Shapes**: Nested per-token arrays or flat buffers with dims
//! - **Normalization**: Mean pooling down to one vector per input
//! - **Similarity**: Cosine similarity with explicit zero-norm handling
//! - **HTTP Runtime**: Client for feature-extraction endpoints
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Embeddings Pipeline                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  EmbeddingModel ──► RawModelOutput ──► normalize ──► Embedding  │
//! │       │                                                 │       │
//! │       ▼                                                 ▼       │
//! │  HttpModel                                 cosine_similarity    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod normalize;
pub mod output;
pub mod provider;
pub mod similarity;

pub use error::{EmbeddingError, Result};
pub use normalize::{NormalizedOutput, normalize};
pub use output::{BatchItem, RawModelOutput};
pub use provider::{EmbeddingModel, HttpModel};
pub use similarity::{cosine_similarity, mean_pool};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;
