//! Comparison sessions.
//!
//! A session walks through `Idle -> ModelLoading -> Ready -> Comparing ->
//! Result | Failed`. Per-request failures leave the session usable; only a
//! failed model load is fatal.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use textsim_embeddings::{EmbeddingModel, NormalizedOutput, cosine_similarity, normalize};
use tokio::sync::{Mutex, RwLock};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{ComparisonError, FailureKind, Result, TextRole};
use crate::model::{ModelHandle, ModelLoader, ModelStatus};

/// Result of comparing two texts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    /// Identifier of the request that produced this outcome.
    pub request_id: Uuid,

    /// Pooled embedding of the user text.
    pub user: NormalizedOutput,

    /// Pooled embedding of the expected text.
    pub expected: NormalizedOutput,

    /// Cosine similarity of the two embeddings.
    pub similarity: f32,

    /// When the comparison finished.
    pub completed_at: DateTime<Utc>,
}

/// A failure as recorded in the session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
    pub fatal: bool,
}

impl From<&ComparisonError> for Failure {
    fn from(err: &ComparisonError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
            fatal: err.is_fatal(),
        }
    }
}

/// Observable state of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    ModelLoading,
    Ready,
    Comparing,
    Result(ComparisonOutcome),
    Failed(Failure),
}

/// Pairs two texts through an owned embedding model.
#[derive(Debug, Default)]
pub struct ComparisonSession {
    model: ModelHandle,
    state: RwLock<SessionState>,
    in_flight: Mutex<()>,
}

impl ComparisonSession {
    /// Create a session whose model still has to be loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session around an already initialized model.
    pub fn with_model(model: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            model: ModelHandle::ready(model),
            state: RwLock::new(SessionState::Ready),
            in_flight: Mutex::new(()),
        }
    }

    /// Load the model. A failure here is fatal for the session.
    pub async fn load(&self, loader: &dyn ModelLoader) -> Result<()> {
        {
            let mut state = self.state.write().await;
            if *state != SessionState::Idle {
                drop(state);
                return self.model.acquire().await.map(|_| ());
            }
            *state = SessionState::ModelLoading;
        }

        match self.model.load(loader).await {
            Ok(()) => {
                self.set_state(SessionState::Ready).await;
                Ok(())
            }
            Err(err) => {
                self.set_state(SessionState::Failed(Failure::from(&err)))
                    .await;
                Err(err)
            }
        }
    }

    /// Compare two texts.
    ///
    /// Both texts are embedded concurrently and the request waits for both.
    /// Any previous result is cleared before the model is called. A request
    /// arriving while another is running is rejected with
    /// [`ComparisonError::Busy`].
    pub async fn compare(&self, user_text: &str, expected_text: &str) -> Result<ComparisonOutcome> {
        if user_text.trim().is_empty() || expected_text.trim().is_empty() {
            return Err(ComparisonError::EmptyInput);
        }

        let model = self.model.acquire().await?;
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| ComparisonError::Busy)?;

        let request_id = Uuid::new_v4();
        self.set_state(SessionState::Comparing).await;

        let result = run_comparison(model.as_ref(), request_id, user_text, expected_text)
            .instrument(info_span!("comparison", %request_id))
            .await;

        match &result {
            Ok(outcome) => {
                self.set_state(SessionState::Result(outcome.clone())).await;
            }
            Err(err) => {
                warn!("Comparison {request_id} failed: {err}");
                self.set_state(SessionState::Failed(Failure::from(err)))
                    .await;
            }
        }

        result
    }

    /// Snapshot of the current state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Lifecycle status of the owned model.
    pub async fn model_status(&self) -> ModelStatus {
        self.model.status().await
    }

    async fn set_state(&self, state: SessionState) {
        *self.state.write().await = state;
    }
}

async fn run_comparison(
    model: &dyn EmbeddingModel,
    request_id: Uuid,
    user_text: &str,
    expected_text: &str,
) -> Result<ComparisonOutcome> {
    debug!("Embedding both texts with {}", model.name());

    let (user_raw, expected_raw) = tokio::join!(model.embed(user_text), model.embed(expected_text));

    let user_raw = user_raw.map_err(|source| ComparisonError::ModelInvocation {
        input: TextRole::User,
        source,
    })?;
    let expected_raw = expected_raw.map_err(|source| ComparisonError::ModelInvocation {
        input: TextRole::Expected,
        source,
    })?;

    let user = normalize(&user_raw).map_err(|source| ComparisonError::Normalization {
        input: TextRole::User,
        source,
    })?;
    let expected = normalize(&expected_raw).map_err(|source| ComparisonError::Normalization {
        input: TextRole::Expected,
        source,
    })?;

    let similarity =
        cosine_similarity(&user.vector, &expected.vector).map_err(ComparisonError::Similarity)?;

    info!(
        "Similarity {similarity:.4} ({} vs {} tokens, {} dims)",
        user.token_count,
        expected.token_count,
        user.dimension()
    );

    Ok(ComparisonOutcome {
        request_id,
        user,
        expected,
        similarity,
        completed_at: Utc::now(),
    })
}
