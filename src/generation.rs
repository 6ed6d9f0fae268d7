use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tutor_realtime_types::generation::{GenerateRequest, GenerateResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum GenerationStatus {
    Idle,
    Submitting,
    Waiting,
    Ready,
    Failed,
}

/// Point-in-time snapshot of the tracked job.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GenerationJob {
    id: Option<String>,
    status: GenerationStatus,
    asset_ref: Option<String>,
}

impl GenerationJob {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn asset_ref(&self) -> Option<&str> {
        self.asset_ref.as_deref()
    }
}

/// Seam to the generation backend so the controller's state machine can be
/// exercised without a server.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn submit(&self, request: GenerateRequest) -> Result<GenerateResponse>;
}

/// POSTs `{ text, emotions }` to `/generate` (or the stub variant) and
/// parses `{ video_id }`. Non-2xx responses are failures.
pub struct HttpGenerationBackend {
    client: reqwest::Client,
    base_url: String,
    use_stub: bool,
}

impl HttpGenerationBackend {
    pub fn new(base_url: &str, use_stub: bool) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            use_stub,
        }
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn submit(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let path = if self.use_stub {
            "/generate_stub"
        } else {
            "/generate"
        };
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;
        Ok(response)
    }
}

struct JobState {
    token: u64,
    id: Option<String>,
    status: GenerationStatus,
    asset_ref: Option<String>,
}

/// Drives the submit -> wait -> ready/failed lifecycle. Tracks at most one
/// job: a new submit supersedes whatever came before it, and the response
/// to a superseded submit is discarded when it eventually arrives.
#[derive(Clone)]
pub struct GenerationController {
    backend: Arc<dyn GenerationBackend>,
    base_url: String,
    job: Arc<Mutex<JobState>>,
}

impl GenerationController {
    pub fn new(backend: Arc<dyn GenerationBackend>, base_url: &str) -> Self {
        Self {
            backend,
            base_url: base_url.to_string(),
            job: Arc::new(Mutex::new(JobState {
                token: 0,
                id: None,
                status: GenerationStatus::Idle,
                asset_ref: None,
            })),
        }
    }

    pub fn http(base_url: &str, use_stub: bool) -> Self {
        Self::new(
            Arc::new(HttpGenerationBackend::new(base_url, use_stub)),
            base_url,
        )
    }

    fn with_job<R>(&self, f: impl FnOnce(&mut JobState) -> R) -> Option<R> {
        match self.job.lock() {
            Ok(mut job) => Some(f(&mut job)),
            Err(_) => {
                tracing::error!("failed to lock generation job state");
                None
            }
        }
    }

    /// Submit new topic text. Whitespace-only text is a no-op with no state
    /// transition. Any prior job, even one still Waiting, is superseded.
    /// On failure the job lands in Failed and can be resubmitted
    /// immediately; there is no automatic retry.
    pub async fn submit(&self, text: &str, emotion_context: &str) {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("ignoring generation request with empty text");
            return;
        }
        let Some(token) = self.with_job(|job| {
            job.token += 1;
            job.id = None;
            job.asset_ref = None;
            job.status = GenerationStatus::Submitting;
            job.token
        }) else {
            return;
        };

        let request = GenerateRequest::new(text, emotion_context);
        match self.backend.submit(request).await {
            Ok(response) => {
                self.with_job(|job| {
                    if job.token != token {
                        tracing::debug!("discarding response for superseded job");
                        return;
                    }
                    job.id = Some(response.video_id().to_string());
                    job.status = GenerationStatus::Waiting;
                });
            }
            Err(e) => {
                tracing::error!("generation submit failed: {}", e);
                self.with_job(|job| {
                    if job.token != token {
                        return;
                    }
                    job.status = GenerationStatus::Failed;
                });
            }
        }
    }

    /// Explicit user trigger: once the identifier is known, mark the job
    /// Ready and record the asset reference. The controller never polls
    /// for encoding completion.
    pub fn start_playback(&self) {
        let base_url = self.base_url.clone();
        self.with_job(|job| {
            if job.status != GenerationStatus::Waiting {
                return;
            }
            if let Some(id) = &job.id {
                job.asset_ref = Some(format!("{}/videos/{}", base_url, id));
                job.status = GenerationStatus::Ready;
            }
        });
    }

    /// True while a submit is in flight or a job is waiting for playback.
    /// Cleared on Failed so the loading indicator never sticks.
    pub fn is_loading(&self) -> bool {
        matches!(
            self.snapshot().status(),
            GenerationStatus::Submitting | GenerationStatus::Waiting
        )
    }

    pub fn snapshot(&self) -> GenerationJob {
        self.with_job(|job| GenerationJob {
            id: job.id.clone(),
            status: job.status,
            asset_ref: job.asset_ref.clone(),
        })
        .unwrap_or(GenerationJob {
            id: None,
            status: GenerationStatus::Idle,
            asset_ref: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    /// Backend whose responses are released by the test, one oneshot per
    /// expected call, so in-flight ordering can be controlled exactly.
    struct ScriptedBackend {
        calls: Mutex<VecDeque<oneshot::Receiver<Result<GenerateResponse>>>>,
    }

    impl ScriptedBackend {
        fn new(calls: Vec<oneshot::Receiver<Result<GenerateResponse>>>) -> Self {
            Self {
                calls: Mutex::new(calls.into_iter().collect()),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn submit(&self, _request: GenerateRequest) -> Result<GenerateResponse> {
            let rx = self
                .calls
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected submit call");
            rx.await.expect("test dropped the response sender")
        }
    }

    #[tokio::test]
    async fn empty_text_is_a_no_op() {
        // No expectations set: any backend call would panic.
        let backend = Arc::new(MockGenerationBackend::new());
        let controller = GenerationController::new(backend, "http://localhost:8000");

        controller.submit("", "joy").await;
        controller.submit("   \n\t", "joy").await;

        assert_eq!(controller.snapshot().status(), GenerationStatus::Idle);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn successful_submit_lands_in_waiting_with_id() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_submit()
            .withf(|request| request.text() == "explain entropy" && request.emotions() == "")
            .times(1)
            .returning(|_| Ok(GenerateResponse::new("abc123")));
        let controller =
            GenerationController::new(Arc::new(backend), "http://localhost:8000");

        controller.submit("explain entropy", "").await;

        let job = controller.snapshot();
        assert_eq!(job.status(), GenerationStatus::Waiting);
        assert_eq!(job.id(), Some("abc123"));
        assert!(job.asset_ref().is_none(), "playback must not start on its own");
        assert!(controller.is_loading());
    }

    #[tokio::test]
    async fn submit_trims_text_before_sending() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_submit()
            .withf(|request| request.text() == "explain entropy")
            .times(1)
            .returning(|_| Ok(GenerateResponse::new("abc123")));
        let controller =
            GenerationController::new(Arc::new(backend), "http://localhost:8000");

        controller.submit("  explain entropy  ", "joy, fear").await;
        assert_eq!(controller.snapshot().status(), GenerationStatus::Waiting);
    }

    #[tokio::test]
    async fn failure_lands_in_failed_and_allows_resubmission() {
        let mut backend = MockGenerationBackend::new();
        let mut fail_first = true;
        backend.expect_submit().times(2).returning(move |_| {
            if fail_first {
                fail_first = false;
                Err(anyhow::anyhow!("503 service unavailable"))
            } else {
                Ok(GenerateResponse::new("second"))
            }
        });
        let controller =
            GenerationController::new(Arc::new(backend), "http://localhost:8000");

        controller.submit("explain entropy", "").await;
        assert_eq!(controller.snapshot().status(), GenerationStatus::Failed);
        assert!(!controller.is_loading(), "loading indicator must clear on failure");

        controller.submit("explain entropy", "").await;
        assert_eq!(controller.snapshot().status(), GenerationStatus::Waiting);
    }

    #[tokio::test]
    async fn second_submit_discards_the_prior_jobs_response() {
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let backend = Arc::new(ScriptedBackend::new(vec![first_rx, second_rx]));
        let controller = GenerationController::new(backend, "http://localhost:8000");

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("first topic", "").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let second = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("second topic", "").await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        // The superseded job answers first; its response must be dropped.
        first_tx.send(Ok(GenerateResponse::new("stale"))).unwrap();
        first.await.unwrap();
        assert_eq!(controller.snapshot().status(), GenerationStatus::Submitting);
        assert_eq!(controller.snapshot().id(), None);

        second_tx.send(Ok(GenerateResponse::new("fresh"))).unwrap();
        second.await.unwrap();
        let job = controller.snapshot();
        assert_eq!(job.status(), GenerationStatus::Waiting);
        assert_eq!(job.id(), Some("fresh"));
    }

    #[tokio::test]
    async fn playback_is_an_explicit_trigger() {
        let mut backend = MockGenerationBackend::new();
        backend
            .expect_submit()
            .returning(|_| Ok(GenerateResponse::new("abc123")));
        let controller =
            GenerationController::new(Arc::new(backend), "http://localhost:8000");

        // Nothing to play yet.
        controller.start_playback();
        assert_eq!(controller.snapshot().status(), GenerationStatus::Idle);

        controller.submit("explain entropy", "").await;
        controller.start_playback();

        let job = controller.snapshot();
        assert_eq!(job.status(), GenerationStatus::Ready);
        assert_eq!(
            job.asset_ref(),
            Some("http://localhost:8000/videos/abc123")
        );

        // Triggering again changes nothing.
        controller.start_playback();
        assert_eq!(controller.snapshot().status(), GenerationStatus::Ready);
    }
}
