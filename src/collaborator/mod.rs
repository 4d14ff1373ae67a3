//! Fetch and infer collaborators
//!
//! The pipeline only ever sees the two narrow traits [`SampleFetcher`] and
//! [`SchemaInferrer`]. Implementations:
//!
//! - [`ProxyClient`]: the HTTP middleware (`/fetch`, `/infer`)
//! - [`DirectFetcher`]: retrieves the source URL in-process
//! - [`LlmSchemaInferrer`]: asks an LLM for the schema in-process
//! - [`MockFetcher`] / [`MockInferrer`]: scripted fakes for tests

mod client;
mod error;
mod http;
mod llm;
mod mock;
pub mod prompt;
pub mod response;

pub use client::{SampleFetcher, SchemaInferrer};
pub use error::{CollaboratorError, UNKNOWN_ERROR_MESSAGE};
pub use http::{DirectFetcher, HealthResponse, ProxyClient, DEFAULT_TIMEOUT_SECS};
pub use llm::LlmSchemaInferrer;
pub use mock::{MockFetcher, MockInferrer};
