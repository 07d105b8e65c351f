//! Embedding model lifecycle.
//!
//! A [`ModelHandle`] owns the model explicitly and moves through
//! `Uninitialized -> Loading -> Ready | Failed`. The model is only handed out
//! once `Ready`; a failed load is final for that handle.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use textsim_embeddings::{EmbeddingModel, HttpModel, normalize};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::ModelConfig;
use crate::error::{ComparisonError, Result};

/// Something that can bring an embedding model up.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Initialize the model.
    async fn load(&self) -> Result<Arc<dyn EmbeddingModel>>;
}

/// Loads an [`HttpModel`] from a [`ModelConfig`].
pub struct HttpModelLoader {
    config: ModelConfig,
}

impl HttpModelLoader {
    /// Create a new loader.
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for HttpModelLoader {
    async fn load(&self) -> Result<Arc<dyn EmbeddingModel>> {
        let mut model = HttpModel::new(&self.config.endpoint)
            .with_timeout(Duration::from_secs(self.config.timeout_secs))?;
        if let Some(name) = &self.config.model {
            model = model.with_model(name);
        }
        if let Some(key) = self.config.api_key()? {
            model = model.with_api_key(key);
        }

        if let Some(sample) = &self.config.warmup {
            let output = model.embed(sample).await?;
            let warmed = normalize(&output)?;
            info!(
                "Model at {} answered warm-up with {} dimensions",
                model.endpoint(),
                warmed.dimension()
            );
        }

        Ok(Arc::new(model))
    }
}

/// Lifecycle state of a model.
#[derive(Clone, Default)]
pub enum ModelState {
    /// No load attempted yet.
    #[default]
    Uninitialized,
    /// A load is in progress.
    Loading,
    /// The model is available.
    Ready(Arc<dyn EmbeddingModel>),
    /// Loading failed; the handle stays unusable.
    Failed(String),
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("Uninitialized"),
            Self::Loading => f.write_str("Loading"),
            Self::Ready(model) => f.debug_tuple("Ready").field(&model.name()).finish(),
            Self::Failed(reason) => f.debug_tuple("Failed").field(reason).finish(),
        }
    }
}

/// Payload-free view of [`ModelState`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl From<&ModelState> for ModelStatus {
    fn from(state: &ModelState) -> Self {
        match state {
            ModelState::Uninitialized => Self::Uninitialized,
            ModelState::Loading => Self::Loading,
            ModelState::Ready(_) => Self::Ready,
            ModelState::Failed(_) => Self::Failed,
        }
    }
}

/// Owned handle to an embedding model and its lifecycle.
#[derive(Debug, Default)]
pub struct ModelHandle {
    state: RwLock<ModelState>,
}

impl ModelHandle {
    /// Create an uninitialized handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already initialized model.
    pub fn ready(model: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            state: RwLock::new(ModelState::Ready(model)),
        }
    }

    /// Run the loader once.
    ///
    /// Loading an already ready handle is a no-op. A handle whose load failed
    /// keeps returning that failure without retrying.
    pub async fn load(&self, loader: &dyn ModelLoader) -> Result<()> {
        {
            let mut state = self.state.write().await;
            match &*state {
                ModelState::Uninitialized => *state = ModelState::Loading,
                ModelState::Loading => return Err(ComparisonError::ModelNotReady),
                ModelState::Ready(_) => return Ok(()),
                ModelState::Failed(reason) => return Err(ComparisonError::ModelLoad(reason.clone())),
            }
        }

        info!("Loading embedding model");

        match loader.load().await {
            Ok(model) => {
                info!("Embedding model {} is ready", model.name());
                *self.state.write().await = ModelState::Ready(model);
                Ok(())
            }
            Err(err) => {
                let reason = match err {
                    ComparisonError::ModelLoad(reason) => reason,
                    other => other.to_string(),
                };
                error!("Embedding model failed to load: {reason}");
                *self.state.write().await = ModelState::Failed(reason.clone());
                Err(ComparisonError::ModelLoad(reason))
            }
        }
    }

    /// Borrow the model for a request. Only succeeds once `Ready`.
    pub async fn acquire(&self) -> Result<Arc<dyn EmbeddingModel>> {
        match &*self.state.read().await {
            ModelState::Ready(model) => Ok(Arc::clone(model)),
            ModelState::Failed(reason) => Err(ComparisonError::ModelLoad(reason.clone())),
            ModelState::Uninitialized | ModelState::Loading => Err(ComparisonError::ModelNotReady),
        }
    }

    /// Current lifecycle status.
    pub async fn status(&self) -> ModelStatus {
        ModelStatus::from(&*self.state.read().await)
    }
}
