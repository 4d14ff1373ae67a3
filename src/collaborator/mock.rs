use super::client::{SampleFetcher, SchemaInferrer};
use super::error::CollaboratorError;
use crate::schema::InferredSchema;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted fetch collaborator
///
/// Replies are served in FIFO order. With a gate attached, every call waits
/// for one `notify_one` before replying, which lets tests hold an attempt in
/// flight.
pub struct MockFetcher {
    responses: Mutex<VecDeque<Result<Value, CollaboratorError>>>,
    requested_urls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requested_urls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn add_payload(&self, payload: Value) {
        self.responses.lock().unwrap().push_back(Ok(payload));
    }

    pub fn add_error(&self, error: CollaboratorError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested_urls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requested_urls.lock().unwrap().len()
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleFetcher for MockFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Value, CollaboratorError> {
        self.requested_urls
            .lock()
            .unwrap()
            .push(source_url.to_string());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CollaboratorError::unknown(
                    "MockFetcher: No more responses in queue",
                ))
            })
    }

    fn name(&self) -> &str {
        "MockFetcher"
    }
}

/// Scripted infer collaborator that records every sample it receives
///
/// Like [`MockFetcher`], an attached gate holds each call until notified.
pub struct MockInferrer {
    responses: Mutex<VecDeque<Result<InferredSchema, CollaboratorError>>>,
    samples: Mutex<Vec<Value>>,
    calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl MockInferrer {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            samples: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn add_schema(&self, schema: InferredSchema) {
        self.responses.lock().unwrap().push_back(Ok(schema));
    }

    pub fn add_error(&self, error: CollaboratorError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn received_samples(&self) -> Vec<Value> {
        self.samples.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockInferrer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchemaInferrer for MockInferrer {
    async fn infer(&self, sample: &Value) -> Result<InferredSchema, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.samples.lock().unwrap().push(sample.clone());

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CollaboratorError::unknown(
                    "MockInferrer: No more responses in queue",
                ))
            })
    }

    fn name(&self) -> &str {
        "MockInferrer"
    }

    fn model_info(&self) -> Option<String> {
        Some("mock-model".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Srid;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_fetcher_queue() {
        let fetcher = MockFetcher::new();
        fetcher.add_payload(json!([1, 2]));
        fetcher.add_error(CollaboratorError::structured("boom"));

        assert_eq!(fetcher.fetch("a").await.unwrap(), json!([1, 2]));
        assert!(fetcher.fetch("b").await.is_err());
        assert!(fetcher.fetch("c").await.is_err());
        assert_eq!(fetcher.requested_urls(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_fetcher_gate() {
        let gate = Arc::new(Notify::new());
        let fetcher = MockFetcher::new().with_gate(gate.clone());
        fetcher.add_payload(json!({}));

        gate.notify_one();
        assert!(fetcher.fetch("x").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_inferrer_records_samples() {
        let inferrer = MockInferrer::new();
        inferrer.add_schema(InferredSchema::new("POINT", Srid::Code(4326), vec![]));

        let schema = inferrer.infer(&json!({ "id": 1 })).await.unwrap();
        assert_eq!(schema.geometry_type, "POINT");
        assert_eq!(inferrer.received_samples(), vec![json!({ "id": 1 })]);
        assert_eq!(inferrer.call_count(), 1);
    }
}
