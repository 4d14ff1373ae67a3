//! Pipeline state machine types

use crate::schema::InferredSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    #[default]
    Idle,
    Fetching,
    Inferring,
    Done,
}

impl PipelineState {
    /// An attempt is in flight
    pub fn is_busy(self) -> bool {
        matches!(self, PipelineState::Fetching | PipelineState::Inferring)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Idle => "IDLE",
            PipelineState::Fetching => "FETCHING",
            PipelineState::Inferring => "INFERRING",
            PipelineState::Done => "DONE",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an observer can see about the current attempt
///
/// Only [`crate::pipeline::PipelineController`] mutates it, one whole
/// transition at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub state: PipelineState,

    /// Sample extracted from the fetched payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<InferredSchema>,

    /// User-facing message of the last failed attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineSnapshot {
    pub fn is_done(&self) -> bool {
        self.state == PipelineState::Done
    }

    pub fn is_failed(&self) -> bool {
        self.state == PipelineState::Idle && self.error.is_some()
    }
}
