//! Collaborator errors
//!
//! Every failure coming back from the fetch or infer collaborator is folded into
//! `CollaboratorError`. The controller never inspects variants beyond asking for
//! the best user-facing message.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message surfaced when nothing better is available
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Errors that can occur while talking to a collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollaboratorError {
    /// Collaborator unreachable or replied non-2xx without a structured body
    Transport {
        message: String,
        status_code: Option<u16>,
    },

    /// Request timed out after the specified duration (in seconds)
    Timeout { seconds: u64 },

    /// Collaborator replied with an error body carrying a `detail` message
    Structured {
        detail: String,
        status_code: Option<u16>,
    },

    /// Unexpected response shape or any other failure
    Unknown { message: String },
}

impl CollaboratorError {
    pub fn transport(message: impl Into<String>) -> Self {
        CollaboratorError::Transport {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn structured(detail: impl Into<String>) -> Self {
        CollaboratorError::Structured {
            detail: detail.into(),
            status_code: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        CollaboratorError::Unknown {
            message: message.into(),
        }
    }

    /// Best available message for the user
    ///
    /// Prefers a structured `detail`, then the transport description, then
    /// [`UNKNOWN_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            CollaboratorError::Structured { detail, .. } if !detail.trim().is_empty() => {
                detail.clone()
            }
            CollaboratorError::Transport { message, .. } if !message.trim().is_empty() => {
                self.to_string()
            }
            CollaboratorError::Timeout { .. } => self.to_string(),
            CollaboratorError::Unknown { message } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether the failure happened below the application protocol
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Transport { .. } | CollaboratorError::Timeout { .. }
        )
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            CollaboratorError::Transport { status_code, .. }
            | CollaboratorError::Structured { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollaboratorError::Transport {
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Request failed with status code {}: {}", code, message)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            CollaboratorError::Timeout { seconds } => {
                write!(f, "Request timed out after {} seconds", seconds)
            }
            CollaboratorError::Structured {
                detail,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "Collaborator error ({}): {}", code, detail)
                } else {
                    write!(f, "Collaborator error: {}", detail)
                }
            }
            CollaboratorError::Unknown { message } => write!(f, "Error: {}", message),
        }
    }
}

impl std::error::Error for CollaboratorError {}
