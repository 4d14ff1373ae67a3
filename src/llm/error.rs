use crate::collaborator::CollaboratorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised by an LLM backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LlmError {
    /// Provider rejected or failed the request
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    /// Request timed out after the specified duration (in seconds)
    TimeoutError { seconds: u64 },

    /// Missing credentials, unknown provider and the like
    ConfigurationError { message: String },

    Other { message: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::ApiError {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "API error ({}): {}", code, message)
                } else {
                    write!(f, "API error: {}", message)
                }
            }
            LlmError::TimeoutError { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            LlmError::ConfigurationError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            LlmError::Other { message } => write!(f, "Error: {}", message),
        }
    }
}

impl std::error::Error for LlmError {}

impl From<LlmError> for CollaboratorError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ApiError {
                message,
                status_code,
            } => CollaboratorError::Transport {
                message,
                status_code,
            },
            LlmError::TimeoutError { seconds } => CollaboratorError::Timeout { seconds },
            other => CollaboratorError::unknown(other.to_string()),
        }
    }
}
