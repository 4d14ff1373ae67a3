//! In-process schema inference backed by an LLM
//!
//! `LlmSchemaInferrer` asks the model for a schema using the prompts in
//! [`super::prompt`] and parses the reply with
//! [`super::response::parse_schema_response`].

use super::client::SchemaInferrer;
use super::error::CollaboratorError;
use super::prompt::{build_inference_prompt, SYSTEM_PROMPT};
use super::response::parse_schema_response;
use crate::llm::{ChatMessage, LLMClient, LLMRequest};
use crate::schema::InferredSchema;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Low temperature keeps replies close to deterministic
const INFERENCE_TEMPERATURE: f32 = 0.1;

pub struct LlmSchemaInferrer {
    client: Arc<dyn LLMClient>,
    /// Largest serialized sample accepted, in bytes
    max_sample_size: usize,
}

impl LlmSchemaInferrer {
    pub fn new(client: Arc<dyn LLMClient>, max_sample_size: usize) -> Self {
        Self {
            client,
            max_sample_size,
        }
    }
}

#[async_trait]
impl SchemaInferrer for LlmSchemaInferrer {
    async fn infer(&self, sample: &Value) -> Result<InferredSchema, CollaboratorError> {
        let sample_size = serde_json::to_vec(sample)
            .map(|bytes| bytes.len())
            .map_err(|e| CollaboratorError::unknown(format!("Sample is not serializable: {}", e)))?;
        if sample_size > self.max_sample_size {
            warn!(
                sample_size,
                limit = self.max_sample_size,
                "Sample too large for inference"
            );
            return Err(CollaboratorError::structured(format!(
                "Sample is too large for inference ({} bytes, limit {})",
                sample_size, self.max_sample_size
            )));
        }

        let prompt = build_inference_prompt(sample);
        debug!(
            backend = self.client.name(),
            "Built inference prompt with {} characters",
            prompt.len()
        );

        let request = LLMRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(INFERENCE_TEMPERATURE);

        let response = self.client.chat(request).await?;
        debug!(
            "Received reply with {} characters in {:?}",
            response.content.len(),
            response.response_time
        );

        let schema = parse_schema_response(&response.content)?;
        info!(
            geometry_type = %schema.geometry_type,
            srid = %schema.srid,
            fields = schema.fields.len(),
            "Schema inferred by {}",
            self.client.name()
        );

        Ok(schema)
    }

    fn name(&self) -> &str {
        self.client.name()
    }

    fn model_info(&self) -> Option<String> {
        self.client.model_info()
    }
}

impl std::fmt::Debug for LlmSchemaInferrer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSchemaInferrer")
            .field("backend", &self.client.name())
            .field("max_sample_size", &self.max_sample_size)
            .finish()
    }
}
