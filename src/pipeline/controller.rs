//! Pipeline controller
//!
//! Drives one attempt at a time through fetch → sample → infer:
//!
//! ```text
//! IDLE --submit--> FETCHING --fetch_ok--> INFERRING --infer_ok--> DONE
//!                  FETCHING --fetch_err--> IDLE
//!                                         INFERRING --infer_err--> IDLE
//! ```
//!
//! The `{state, sample, schema, error}` tuple lives in a `tokio::sync::watch`
//! channel and every transition replaces it in a single `send_modify`, so a
//! subscriber never observes a half-applied transition.

use super::sample::extract_sample_with_origin;
use super::state::{PipelineSnapshot, PipelineState};
use crate::collaborator::{CollaboratorError, SampleFetcher, SchemaInferrer};
use crate::progress::{ProgressEvent, ProgressHandler};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Message recorded when the future driving an attempt is dropped mid-flight
pub const CANCELLED_MESSAGE: &str = "Attempt cancelled before completion";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// `process` was called while another attempt was still resolving
    #[error("An attempt is already in flight")]
    AttemptInFlight,
}

pub struct PipelineController {
    fetcher: Arc<dyn SampleFetcher>,
    inferrer: Arc<dyn SchemaInferrer>,
    state: watch::Sender<PipelineSnapshot>,
    busy: AtomicBool,
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

/// Holds the busy flag for the duration of one attempt
///
/// Dropping an unfinished guard means the attempt's future was dropped; the
/// controller is returned to `IDLE` with [`CANCELLED_MESSAGE`].
struct AttemptGuard<'a> {
    controller: &'a PipelineController,
    finished: bool,
}

impl<'a> AttemptGuard<'a> {
    fn acquire(controller: &'a PipelineController) -> Result<Self, ControllerError> {
        controller
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ControllerError::AttemptInFlight)?;

        Ok(Self {
            controller,
            finished: false,
        })
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Attempt dropped while in flight");
            let stage = self.controller.state();
            self.controller.transition(|snapshot| {
                if snapshot.state.is_busy() {
                    snapshot.state = PipelineState::Idle;
                    snapshot.error = Some(CANCELLED_MESSAGE.to_string());
                }
            });
            self.controller.emit(ProgressEvent::Failed {
                stage,
                error: CANCELLED_MESSAGE.to_string(),
            });
        }
        self.controller.busy.store(false, Ordering::Release);
    }
}

impl PipelineController {
    pub fn new(fetcher: Arc<dyn SampleFetcher>, inferrer: Arc<dyn SchemaInferrer>) -> Self {
        let (state, _) = watch::channel(PipelineSnapshot::default());

        Self {
            fetcher,
            inferrer,
            state,
            busy: AtomicBool::new(false),
            progress_handler: None,
        }
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = Some(handler);
        self
    }

    /// Copy of the current tuple
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.state.borrow().clone()
    }

    pub fn state(&self) -> PipelineState {
        self.state.borrow().state
    }

    /// True while an attempt holds the controller; callers must not submit
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Receiver that sees every transition as a whole snapshot
    pub fn subscribe(&self) -> watch::Receiver<PipelineSnapshot> {
        self.state.subscribe()
    }

    /// Runs one attempt for `source_url`
    ///
    /// An empty URL is a no-op and returns the current snapshot untouched.
    /// Collaborator failures do not surface as `Err`: they end the attempt in
    /// `IDLE` with `error` set, and that snapshot is returned.
    pub async fn process(&self, source_url: &str) -> Result<PipelineSnapshot, ControllerError> {
        if source_url.is_empty() {
            debug!("Ignoring submission with empty source URL");
            return Ok(self.snapshot());
        }

        let guard = AttemptGuard::acquire(self)?;
        let start = Instant::now();

        info!(source = %source_url, "Starting pipeline attempt");
        self.emit(ProgressEvent::AttemptStarted {
            source_url: source_url.to_string(),
        });

        self.transition(|snapshot| {
            *snapshot = PipelineSnapshot {
                state: PipelineState::Fetching,
                ..PipelineSnapshot::default()
            };
        });

        let fetch_start = Instant::now();
        let payload = match self.fetcher.fetch(source_url).await {
            Ok(payload) => payload,
            Err(err) => {
                let snapshot = self.fail(PipelineState::Fetching, &err);
                guard.finish();
                return Ok(snapshot);
            }
        };
        self.emit(ProgressEvent::FetchComplete {
            fetcher: self.fetcher.name().to_string(),
            fetch_time: fetch_start.elapsed(),
        });

        let (sample, origin) = extract_sample_with_origin(&payload);
        drop(payload);
        debug!(?origin, "Sample extracted");

        self.transition(|snapshot| {
            snapshot.sample = Some(sample.clone());
            snapshot.state = PipelineState::Inferring;
        });
        self.emit(ProgressEvent::SampleExtracted { origin });

        let infer_start = Instant::now();
        let schema = match self.inferrer.infer(&sample).await {
            Ok(schema) => schema,
            Err(err) => {
                let snapshot = self.fail(PipelineState::Inferring, &err);
                guard.finish();
                return Ok(snapshot);
            }
        };
        self.emit(ProgressEvent::InferenceComplete {
            inferrer: self.inferrer.name().to_string(),
            fields: schema.fields.len(),
            inference_time: infer_start.elapsed(),
        });

        self.transition(|snapshot| {
            snapshot.schema = Some(schema);
            snapshot.state = PipelineState::Done;
        });

        info!(
            "Pipeline attempt complete in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        self.emit(ProgressEvent::Completed {
            total_time: start.elapsed(),
        });

        let snapshot = self.snapshot();
        guard.finish();
        Ok(snapshot)
    }

    /// Ends the attempt in `IDLE` with the best available message
    fn fail(&self, stage: PipelineState, err: &CollaboratorError) -> PipelineSnapshot {
        let message = err.user_message();
        warn!(%stage, error = %err, "Pipeline attempt failed");

        self.transition(|snapshot| {
            snapshot.error = Some(message.clone());
            snapshot.state = PipelineState::Idle;
        });
        self.emit(ProgressEvent::Failed {
            stage,
            error: message,
        });

        self.snapshot()
    }

    /// Applies one transition atomically
    fn transition(&self, apply: impl FnOnce(&mut PipelineSnapshot)) {
        let mut change = None;
        self.state.send_modify(|snapshot| {
            let from = snapshot.state;
            apply(snapshot);
            if from != snapshot.state {
                change = Some((from, snapshot.state));
            }
        });

        if let Some((from, to)) = change {
            debug!(%from, %to, "State transition");
            self.emit(ProgressEvent::StateChanged { from, to });
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }
}

impl std::fmt::Debug for PipelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineController")
            .field("fetcher", &self.fetcher.name())
            .field("inferrer", &self.inferrer.name())
            .field("state", &self.state())
            .field("busy", &self.is_busy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{MockFetcher, MockInferrer};
    use crate::schema::{FieldMapping, InferredSchema, Srid};
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    fn point_schema() -> InferredSchema {
        InferredSchema::new(
            "POINT",
            Srid::Code(4326),
            vec![FieldMapping::new("nome", "nome", "TEXT")],
        )
    }

    fn controller(fetcher: Arc<MockFetcher>, inferrer: Arc<MockInferrer>) -> PipelineController {
        PipelineController::new(fetcher, inferrer)
    }

    #[derive(Default)]
    struct RecordingHandler {
        transitions: Mutex<Vec<(PipelineState, PipelineState)>>,
    }

    impl ProgressHandler for RecordingHandler {
        fn on_progress(&self, event: &ProgressEvent) {
            if let ProgressEvent::StateChanged { from, to } = event {
                self.transitions.lock().unwrap().push((*from, *to));
            }
        }
    }

    #[tokio::test]
    async fn test_successful_attempt() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_payload(json!([{"id": 1, "nome": "A"}, {"id": 2, "nome": "B"}]));
        let inferrer = Arc::new(MockInferrer::new());
        inferrer.add_schema(point_schema());

        let controller = controller(fetcher.clone(), inferrer.clone());
        let snapshot = controller.process("https://example.com/api").await.unwrap();

        assert_eq!(snapshot.state, PipelineState::Done);
        assert_eq!(snapshot.sample, Some(json!({"id": 1, "nome": "A"})));
        assert_eq!(snapshot.schema, Some(point_schema()));
        assert!(snapshot.error.is_none());
        assert_eq!(inferrer.received_samples(), vec![json!({"id": 1, "nome": "A"})]);
        assert_eq!(fetcher.requested_urls(), vec!["https://example.com/api"]);
        assert!(!controller.is_busy());
    }

    #[tokio::test]
    async fn test_empty_url_is_noop() {
        let fetcher = Arc::new(MockFetcher::new());
        let inferrer = Arc::new(MockInferrer::new());
        let controller = controller(fetcher.clone(), inferrer.clone());

        let snapshot = controller.process("").await.unwrap();

        assert_eq!(snapshot, PipelineSnapshot::default());
        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(inferrer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_no_sample() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_error(CollaboratorError::structured("timeout"));
        let inferrer = Arc::new(MockInferrer::new());
        let controller = controller(fetcher, inferrer.clone());

        let snapshot = controller.process("https://example.com").await.unwrap();

        assert_eq!(snapshot.state, PipelineState::Idle);
        assert_eq!(snapshot.error.as_deref(), Some("timeout"));
        assert!(snapshot.sample.is_none());
        assert!(snapshot.schema.is_none());
        assert_eq!(inferrer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_infer_failure_keeps_sample() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_payload(json!({"id": 7}));
        let inferrer = Arc::new(MockInferrer::new());
        inferrer.add_error(CollaboratorError::Timeout { seconds: 30 });
        let controller = controller(fetcher, inferrer);

        let snapshot = controller.process("https://example.com").await.unwrap();

        assert_eq!(snapshot.state, PipelineState::Idle);
        assert_eq!(snapshot.sample, Some(json!({"id": 7})));
        assert!(snapshot.schema.is_none());
        assert_eq!(
            snapshot.error.as_deref(),
            Some("Request timed out after 30 seconds")
        );
    }

    #[tokio::test]
    async fn test_new_attempt_clears_previous_error() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_error(CollaboratorError::structured("not found"));
        fetcher.add_payload(json!({"id": 1}));
        let inferrer = Arc::new(MockInferrer::new());
        inferrer.add_schema(point_schema());
        let controller = controller(fetcher, inferrer);

        let failed = controller.process("https://a").await.unwrap();
        assert!(failed.is_failed());

        let done = controller.process("https://b").await.unwrap();
        assert!(done.is_done());
        assert!(done.error.is_none());
    }

    #[tokio::test]
    async fn test_transitions_are_reported_in_order() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_payload(json!({"id": 1}));
        let inferrer = Arc::new(MockInferrer::new());
        inferrer.add_schema(point_schema());
        let handler = Arc::new(RecordingHandler::default());

        let controller = controller(fetcher, inferrer).with_progress_handler(handler.clone());
        controller.process("https://example.com").await.unwrap();

        assert_eq!(
            *handler.transitions.lock().unwrap(),
            vec![
                (PipelineState::Idle, PipelineState::Fetching),
                (PipelineState::Fetching, PipelineState::Inferring),
                (PipelineState::Inferring, PipelineState::Done),
            ]
        );
    }

    #[tokio::test]
    async fn test_reentry_is_rejected_while_busy() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(MockFetcher::new().with_gate(gate.clone()));
        fetcher.add_payload(json!({"id": 1}));
        let inferrer = Arc::new(MockInferrer::new());
        inferrer.add_schema(point_schema());
        let controller = Arc::new(controller(fetcher.clone(), inferrer));

        let running = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.process("https://first").await })
        };

        while !controller.is_busy() {
            tokio::task::yield_now().await;
        }

        let second = controller.process("https://second").await;
        assert_eq!(second.unwrap_err(), ControllerError::AttemptInFlight);

        gate.notify_one();
        let first = running.await.unwrap().unwrap();
        assert!(first.is_done());
        assert_eq!(fetcher.requested_urls(), vec!["https://first"]);
    }

    #[tokio::test]
    async fn test_reentry_is_rejected_while_inferring() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_payload(json!([{"id": 1}, {"id": 2}]));
        let inferrer = Arc::new(MockInferrer::new().with_gate(gate.clone()));
        inferrer.add_schema(point_schema());
        let controller = Arc::new(controller(fetcher.clone(), inferrer.clone()));

        let running = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.process("https://first").await })
        };

        while controller.state() != PipelineState::Inferring {
            tokio::task::yield_now().await;
        }

        let second = controller.process("https://second").await;
        assert_eq!(second.unwrap_err(), ControllerError::AttemptInFlight);

        let held = controller.snapshot();
        assert_eq!(held.state, PipelineState::Inferring);
        assert_eq!(held.sample, Some(json!({"id": 1})));

        gate.notify_one();
        let first = running.await.unwrap().unwrap();
        assert!(first.is_done());
        assert_eq!(first.sample, Some(json!({"id": 1})));
        assert_eq!(fetcher.requested_urls(), vec!["https://first"]);
        assert_eq!(inferrer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dropped_attempt_returns_to_idle() {
        let gate = Arc::new(Notify::new());
        let fetcher = Arc::new(MockFetcher::new().with_gate(gate));
        let inferrer = Arc::new(MockInferrer::new());
        let controller = controller(fetcher, inferrer);

        let attempt = controller.process("https://slow");
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), attempt).await;
        assert!(timed_out.is_err());

        assert!(!controller.is_busy());
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.state, PipelineState::Idle);
        assert_eq!(snapshot.error.as_deref(), Some(CANCELLED_MESSAGE));
    }

    #[tokio::test]
    async fn test_subscriber_observes_final_snapshot() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.add_payload(json!({"features": [{"id": 9}]}));
        let inferrer = Arc::new(MockInferrer::new());
        inferrer.add_error(CollaboratorError::unknown(""));
        let controller = controller(fetcher, inferrer);
        let mut rx = controller.subscribe();

        let snapshot = controller.process("https://example.com").await.unwrap();
        assert_eq!(snapshot.error.as_deref(), Some("Unknown error"));

        assert!(rx.has_changed().unwrap());
        let latest = rx.borrow_and_update().clone();
        assert_eq!(latest.sample, Some(json!({"id": 9})));
    }
}
