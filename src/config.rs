//! Configuration management for easyapigis
//!
//! Settings are loaded from environment variables with sensible defaults.
//!
//! # Environment Variables
//!
//! - `EASYAPIGIS_ENDPOINT`: Middleware base URL - default: "http://localhost:8000"
//! - `EASYAPIGIS_PROVIDER`: genai provider for local inference
//!   (groq|ollama|openai|anthropic|gemini|xai) - default: "groq"
//! - `EASYAPIGIS_MODEL`: Model name - default: "llama-3.1-8b-instant"
//! - `EASYAPIGIS_REQUEST_TIMEOUT`: Timeout in seconds - default: "30"
//! - `EASYAPIGIS_MAX_SAMPLE_SIZE`: Largest serialized sample sent to local
//!   inference, in bytes - default: "512000"
//! - `EASYAPIGIS_LOG_LEVEL`: Logging level - default: "info"
//!
//! Provider credentials (`GROQ_API_KEY`, `OPENAI_API_KEY`, ...) are read by
//! genai directly. `EASYAPIGIS_API_BASE_URL` overrides the provider endpoint.
//!
//! # Example
//!
//! ```no_run
//! use easyapigis::config::{EasyApiGisConfig, ExecutionMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = EasyApiGisConfig::default();
//! config.validate()?;
//!
//! let controller = config.create_controller(ExecutionMode::Proxy)?;
//! let snapshot = controller.process("https://example.com/layer.geojson").await?;
//! println!("{:?}", snapshot.state);
//! # Ok(())
//! # }
//! ```

use crate::collaborator::{
    CollaboratorError, DirectFetcher, LlmSchemaInferrer, ProxyClient, SampleFetcher,
    SchemaInferrer, DEFAULT_TIMEOUT_SECS,
};
use crate::llm::{GenAIClient, LlmError};
use crate::pipeline::PipelineController;
use crate::progress::LoggingHandler;
use genai::adapter::AdapterKind;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
const DEFAULT_PROVIDER: AdapterKind = AdapterKind::Groq;
const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_SAMPLE_SIZE: usize = 512_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid provider: {0}. Valid options: groq, ollama, openai, anthropic, gemini, xai")]
    InvalidProvider(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("LLM backend initialization failed: {0}")]
    BackendInitError(#[from] LlmError),

    #[error("Collaborator initialization failed: {0}")]
    CollaboratorInitError(#[from] CollaboratorError),
}

/// Where the two collaborators run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Both calls go through the HTTP middleware
    Proxy,
    /// Direct fetch of the source URL plus in-process LLM inference
    Local,
}

#[derive(Debug, Clone)]
pub struct EasyApiGisConfig {
    /// Middleware base URL
    pub endpoint: String,

    /// genai provider used in local mode
    pub provider: AdapterKind,

    /// Model name (provider-specific)
    pub model: String,

    pub request_timeout_secs: u64,

    /// Largest serialized sample accepted in local mode, in bytes
    pub max_sample_size: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

pub fn parse_provider(name: &str) -> Result<AdapterKind, ConfigError> {
    AdapterKind::from_lower_str(&name.trim().to_lowercase())
        .ok_or_else(|| ConfigError::InvalidProvider(name.to_string()))
}

impl Default for EasyApiGisConfig {
    /// Loads from `EASYAPIGIS_*` environment variables, falling back to defaults
    fn default() -> Self {
        let endpoint =
            env::var("EASYAPIGIS_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let provider = env::var("EASYAPIGIS_PROVIDER")
            .ok()
            .and_then(|s| parse_provider(&s).ok())
            .unwrap_or(DEFAULT_PROVIDER);

        let model = env::var("EASYAPIGIS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let request_timeout_secs = env::var("EASYAPIGIS_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let max_sample_size = env::var("EASYAPIGIS_MAX_SAMPLE_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_SAMPLE_SIZE);

        let log_level = env::var("EASYAPIGIS_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            endpoint,
            provider,
            model,
            request_timeout_secs,
            max_sample_size,
            log_level,
        }
    }
}

impl EasyApiGisConfig {
    /// Checks ranges and formats
    ///
    /// Provider credentials are checked later, when the LLM client is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::ValidationFailed(format!(
                "Endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        if self.max_sample_size < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Max sample size must be at least 1KB".to_string(),
            ));
        }
        if self.max_sample_size > 10_485_760 {
            return Err(ConfigError::ValidationFailed(
                "Max sample size cannot exceed 10MB".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the middleware client
    pub fn create_proxy_client(&self) -> Result<ProxyClient, ConfigError> {
        Ok(ProxyClient::new(&self.endpoint, self.request_timeout())?)
    }

    /// Builds a controller wired to the collaborators for `mode`
    pub fn create_controller(
        &self,
        mode: ExecutionMode,
    ) -> Result<PipelineController, ConfigError> {
        let fetcher: Arc<dyn SampleFetcher>;
        let inferrer: Arc<dyn SchemaInferrer>;

        match mode {
            ExecutionMode::Proxy => {
                let proxy = Arc::new(self.create_proxy_client()?);
                fetcher = proxy.clone();
                inferrer = proxy;
            }
            ExecutionMode::Local => {
                let client =
                    GenAIClient::new(self.provider, self.model.clone(), self.request_timeout())?;
                fetcher = Arc::new(DirectFetcher::new(self.request_timeout())?);
                inferrer = Arc::new(LlmSchemaInferrer::new(
                    Arc::new(client),
                    self.max_sample_size,
                ));
            }
        }

        Ok(PipelineController::new(fetcher, inferrer)
            .with_progress_handler(Arc::new(LoggingHandler)))
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("endpoint".to_string(), self.endpoint.clone());
        map.insert("provider".to_string(), self.provider.as_lower_str().to_string());
        map.insert("model".to_string(), self.model.clone());
        map.insert(
            "request_timeout_secs".to_string(),
            self.request_timeout_secs.to_string(),
        );
        map.insert(
            "max_sample_size".to_string(),
            self.max_sample_size.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for EasyApiGisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "EasyAPIGIS Configuration:")?;
        writeln!(f, "  Endpoint: {}", self.endpoint)?;
        writeln!(f, "  Provider: {}", self.provider.as_lower_str())?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Max Sample Size: {} bytes", self.max_sample_size)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
