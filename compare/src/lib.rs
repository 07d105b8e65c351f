//! # Comparison Sessions
//!
//! This crate pairs two texts through a sentence-embedding model and scores
//! how similar they are:
//!
//! - **Model Lifecycle**: An explicitly owned model handle
//! - **Sessions**: Per-request state machine with join semantics
//! - **Configuration**: TOML config for the model runtime and display
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Comparison Session                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   user text ──► embed ──► normalize ─┐                          │
//! │                                      ├──► cosine_similarity     │
//! │   expected text ──► embed ──► normalize ─┘                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use textsim_compare::{ComparisonConfig, ComparisonSession, HttpModelLoader};
//!
//! let config = ComparisonConfig::load_default()?;
//! let session = ComparisonSession::new();
//! session.load(&HttpModelLoader::new(config.model)).await?;
//!
//! let outcome = session.compare("The cat sat.", "A cat was sitting.").await?;
//! println!("{:.3}", outcome.similarity);
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod session;

pub use config::{ComparisonConfig, DisplayConfig, ModelConfig};
pub use error::{ComparisonError, FailureKind, Result, TextRole};
pub use model::{HttpModelLoader, ModelHandle, ModelLoader, ModelState, ModelStatus};
pub use session::{ComparisonOutcome, ComparisonSession, Failure, SessionState};

// Re-export from dependencies for convenience
pub use textsim_embeddings::{EmbeddingModel, NormalizedOutput, RawModelOutput};
