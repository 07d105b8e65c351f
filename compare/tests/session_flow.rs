use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use textsim_compare::{
    ComparisonError, ComparisonSession, EmbeddingModel, FailureKind, ModelLoader, ModelStatus,
    RawModelOutput, SessionState,
};
use textsim_embeddings::EmbeddingError;
use tokio::sync::{Barrier, Notify};

/// Both embed calls must be in flight at the same time for either to finish.
struct RendezvousModel {
    barrier: Barrier,
}

#[async_trait]
impl EmbeddingModel for RendezvousModel {
    fn name(&self) -> &str {
        "rendezvous"
    }

    async fn embed(&self, text: &str) -> textsim_embeddings::Result<RawModelOutput> {
        self.barrier.wait().await;
        Ok(RawModelOutput::pooled(vec![text.len() as f32, 1.0]))
    }
}

/// Holds every call until released.
struct GatedModel {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl EmbeddingModel for GatedModel {
    fn name(&self) -> &str {
        "gated"
    }

    async fn embed(&self, _text: &str) -> textsim_embeddings::Result<RawModelOutput> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(RawModelOutput::tokens(vec![vec![3.0, 4.0]]))
    }
}

/// Holds only the text `"hold"` until released; answers everything else at once.
struct HoldingModel {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl EmbeddingModel for HoldingModel {
    fn name(&self) -> &str {
        "holding"
    }

    async fn embed(&self, text: &str) -> textsim_embeddings::Result<RawModelOutput> {
        if text == "hold" {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(RawModelOutput::pooled(vec![0.0, 1.0]))
        } else {
            Ok(RawModelOutput::pooled(vec![1.0, 0.0]))
        }
    }
}

/// Answers the user text slowly and the expected text immediately.
struct SkewedModel;

#[async_trait]
impl EmbeddingModel for SkewedModel {
    fn name(&self) -> &str {
        "skewed"
    }

    async fn embed(&self, text: &str) -> textsim_embeddings::Result<RawModelOutput> {
        if text == "slow" {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(RawModelOutput::pooled(vec![1.0, 0.0]))
        } else {
            Ok(RawModelOutput::tensor(vec![0.0, 2.0, 0.0, 4.0], vec![2, 2]))
        }
    }
}

struct BrokenLoader;

#[async_trait]
impl ModelLoader for BrokenLoader {
    async fn load(&self) -> textsim_compare::Result<Arc<dyn EmbeddingModel>> {
        Err(ComparisonError::Embedding(EmbeddingError::ApiRequest(
            "connection refused".to_string(),
        )))
    }
}

struct ReadyLoader;

#[async_trait]
impl ModelLoader for ReadyLoader {
    async fn load(&self) -> textsim_compare::Result<Arc<dyn EmbeddingModel>> {
        Ok(Arc::new(SkewedModel))
    }
}

#[tokio::test]
async fn embed_calls_run_concurrently() {
    let session = ComparisonSession::with_model(Arc::new(RendezvousModel {
        barrier: Barrier::new(2),
    }));

    let outcome = tokio::time::timeout(Duration::from_secs(5), session.compare("abc", "abcdef"))
        .await
        .expect("embed calls were serialized")
        .unwrap();

    assert_eq!(outcome.user.vector, vec![3.0, 1.0]);
    assert_eq!(outcome.expected.vector, vec![6.0, 1.0]);
}

#[tokio::test]
async fn results_follow_request_order_not_completion_order() {
    let session = ComparisonSession::with_model(Arc::new(SkewedModel));
    let outcome = session.compare("slow", "fast").await.unwrap();

    assert_eq!(outcome.user.vector, vec![1.0, 0.0]);
    assert_eq!(outcome.user.token_count, 1);
    assert_eq!(outcome.expected.vector, vec![0.0, 3.0]);
    assert_eq!(outcome.expected.token_count, 2);
    assert!(outcome.similarity.abs() < 1e-6);
}

#[tokio::test]
async fn overlapping_request_is_rejected() {
    let model = Arc::new(GatedModel {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let session = Arc::new(ComparisonSession::with_model(model.clone()));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.compare("one", "two").await })
    };

    model.entered.notified().await;
    assert_eq!(session.state().await, SessionState::Comparing);

    let second = session.compare("three", "four").await;
    assert!(matches!(second, Err(ComparisonError::Busy)));

    model.release.notify_waiters();
    // The second embed call may not have reached the gate yet.
    let outcome = loop {
        if first.is_finished() {
            break first.await.unwrap().unwrap();
        }
        model.release.notify_waiters();
        tokio::task::yield_now().await;
    };

    assert!((outcome.similarity - 1.0).abs() < 1e-6);
    assert_eq!(outcome.user.vector, vec![3.0, 4.0]);
    assert!(matches!(session.state().await, SessionState::Result(_)));
}

#[tokio::test]
async fn previous_result_is_hidden_while_next_comparison_runs() {
    let model = Arc::new(HoldingModel {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let session = Arc::new(ComparisonSession::with_model(model.clone()));

    let earlier = session.compare("east", "east").await.unwrap();
    assert!((earlier.similarity - 1.0).abs() < 1e-6);
    assert!(matches!(session.state().await, SessionState::Result(_)));

    let next = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.compare("hold", "east").await })
    };

    model.entered.notified().await;
    let state = session.state().await;
    assert!(!matches!(state, SessionState::Result(_)));
    assert_eq!(state, SessionState::Comparing);

    model.release.notify_one();
    let outcome = next.await.unwrap().unwrap();
    assert!(outcome.similarity.abs() < 1e-6);
    assert_ne!(outcome.request_id, earlier.request_id);
    match session.state().await {
        SessionState::Result(current) => assert_eq!(current, outcome),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn load_then_compare() {
    let session = ComparisonSession::new();
    assert_eq!(session.state().await, SessionState::Idle);

    session.load(&ReadyLoader).await.unwrap();
    assert_eq!(session.state().await, SessionState::Ready);
    assert_eq!(session.model_status().await, ModelStatus::Ready);

    let outcome = session.compare("slow", "slow").await.unwrap();
    assert!((outcome.similarity - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn failed_load_is_fatal_for_the_session() {
    let session = ComparisonSession::new();

    let err = session.load(&BrokenLoader).await.unwrap_err();
    assert!(err.is_fatal());

    match session.state().await {
        SessionState::Failed(failure) => {
            assert_eq!(failure.kind, FailureKind::ModelLoad);
            assert!(failure.fatal);
            assert!(failure.message.contains("connection refused"));
        }
        other => panic!("unexpected state: {other:?}"),
    }

    assert!(matches!(
        session.compare("a", "b").await,
        Err(ComparisonError::ModelLoad(_))
    ));
    assert!(matches!(
        session.load(&ReadyLoader).await,
        Err(ComparisonError::ModelLoad(_))
    ));
    assert_eq!(session.model_status().await, ModelStatus::Failed);
}
