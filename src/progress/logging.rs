//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::AttemptStarted { source_url } => {
                info!(source = %source_url, "Starting attempt");
            }
            ProgressEvent::StateChanged { from, to } => {
                debug!(%from, %to, "State transition");
            }
            ProgressEvent::FetchComplete {
                fetcher,
                fetch_time,
            } => {
                info!(
                    fetcher = %fetcher,
                    fetch_time_ms = fetch_time.as_millis(),
                    "Payload fetched"
                );
            }
            ProgressEvent::SampleExtracted { origin } => {
                debug!(?origin, "Sample extracted");
            }
            ProgressEvent::InferenceComplete {
                inferrer,
                fields,
                inference_time,
            } => {
                info!(
                    inferrer = %inferrer,
                    fields,
                    inference_time_ms = inference_time.as_millis(),
                    "Schema inferred"
                );
            }
            ProgressEvent::Completed { total_time } => {
                info!(total_time_ms = total_time.as_millis(), "Attempt complete");
            }
            ProgressEvent::Failed { stage, error } => {
                warn!(%stage, error = %error, "Attempt failed");
            }
        }
    }
}
