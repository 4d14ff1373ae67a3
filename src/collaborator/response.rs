use super::error::CollaboratorError;
use crate::schema::InferredSchema;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Unexpected schema shape: {0}")]
    InvalidSchema(String),
}

impl From<ParseError> for CollaboratorError {
    fn from(err: ParseError) -> Self {
        CollaboratorError::unknown(err.to_string())
    }
}

fn fence_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").unwrap())
}

/// Pulls the JSON object out of a model reply that may be wrapped in prose or
/// markdown fences
pub fn extract_json_from_response(response: &str) -> Result<String, ParseError> {
    let trimmed = response.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed.to_string());
    }

    if trimmed.contains("```") {
        if let Some(json) = fence_pattern()
            .captures(trimmed)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .filter(|json| json.starts_with('{') && json.ends_with('}'))
        {
            return Ok(json.to_string());
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return Ok(trimmed[start..=end].to_string());
        }
    }

    Err(ParseError::InvalidJson(
        "No JSON object found in response".to_string(),
    ))
}

/// Pulls `detail` out of an error body, if it has one
pub fn detail_from_body(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.trim().is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

/// Converts a successful collaborator body into a schema
///
/// An inference service may answer 2xx with `{"error": ..., "details": ...}`
/// when the model call failed; that is reported as a structured failure.
pub fn schema_from_value(value: Value) -> Result<InferredSchema, CollaboratorError> {
    if let Some(detail) = detail_from_body(&value) {
        if value.get("fields").is_none() {
            return Err(CollaboratorError::structured(detail));
        }
    }

    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let mut detail = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if let Some(details) = value.get("details").and_then(Value::as_str) {
            detail = format!("{}: {}", detail, details);
        }
        warn!(error = %detail, "Inference service reported an error");
        return Err(CollaboratorError::structured(detail));
    }

    serde_json::from_value::<InferredSchema>(value).map_err(|e| {
        debug!("Schema did not match expected shape: {}", e);
        ParseError::InvalidSchema(e.to_string()).into()
    })
}

/// Parses a raw model reply into a schema
pub fn parse_schema_response(response: &str) -> Result<InferredSchema, CollaboratorError> {
    debug!("Parsing inference reply ({} chars)", response.len());

    let json_str = extract_json_from_response(response)?;
    let value: Value = serde_json::from_str(&json_str).map_err(|e| {
        warn!("JSON parse error: {}", e);
        ParseError::InvalidJson(format!(
            "{}: {}",
            e,
            json_str.chars().take(100).collect::<String>()
        ))
    })?;

    schema_from_value(value)
}
