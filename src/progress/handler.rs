//! Progress handler trait and events

use crate::pipeline::{PipelineState, SampleOrigin};
use std::time::Duration;

/// Events emitted while an attempt runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A new attempt was accepted
    AttemptStarted { source_url: String },

    /// The controller moved between states
    StateChanged {
        from: PipelineState,
        to: PipelineState,
    },

    /// Fetch collaborator replied with a payload
    FetchComplete {
        fetcher: String,
        fetch_time: Duration,
    },

    /// Sample was extracted and published
    SampleExtracted { origin: SampleOrigin },

    /// Infer collaborator replied with a schema
    InferenceComplete {
        inferrer: String,
        fields: usize,
        inference_time: Duration,
    },

    /// Attempt reached `DONE`
    Completed { total_time: Duration },

    /// Attempt failed while in `stage`
    Failed { stage: PipelineState, error: String },
}

/// Trait for handling progress events
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}
