//! easyapigis - sample geospatial APIs and infer PostGIS layer schemas
//!
//! The library drives a small pipeline: fetch a JSON payload from a source
//! URL, pick one representative record from it, and ask an inference service
//! which geometry, SRID and typed columns a PostGIS table for that data
//! should have.
//!
//! # Core Concepts
//!
//! - **Collaborators**: the [`collaborator::SampleFetcher`] and
//!   [`collaborator::SchemaInferrer`] seams. The default implementation talks
//!   to the easyapigis HTTP middleware; a local mode fetches directly and
//!   calls an LLM through genai.
//! - **Pipeline**: [`pipeline::PipelineController`] runs one attempt at a time
//!   through `IDLE -> FETCHING -> INFERRING -> DONE` and publishes every
//!   transition as a whole [`pipeline::PipelineSnapshot`].
//! - **Schema**: [`schema::InferredSchema`] plus DDL generation for the
//!   `layers` schema.
//!
//! # Example Usage
//!
//! ```no_run
//! use easyapigis::collaborator::ProxyClient;
//! use easyapigis::pipeline::PipelineController;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let proxy = Arc::new(ProxyClient::new("http://localhost:8000", Duration::from_secs(30))?);
//! let controller = PipelineController::new(proxy.clone(), proxy);
//!
//! let snapshot = controller.process("https://example.com/layer.geojson").await?;
//! match snapshot.schema {
//!     Some(schema) => println!("{} in SRID {}", schema.geometry_type, schema.srid),
//!     None => eprintln!("{}", snapshot.error.unwrap_or_default()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - `cli`: Command-line interface
//! - `collaborator`: Fetch and inference clients
//! - `config`: Environment-based configuration
//! - `llm`: Provider-agnostic LLM client used in local mode
//! - `pipeline`: Sample extraction and the state machine
//! - `progress`: Progress events and handlers
//! - `schema`: Inferred schema types and DDL
//! - `util`: Logging setup

pub mod cli;
pub mod collaborator;
pub mod config;
pub mod llm;
pub mod pipeline;
pub mod progress;
pub mod schema;
pub mod util;

pub use collaborator::{CollaboratorError, ProxyClient, SampleFetcher, SchemaInferrer};
pub use config::{ConfigError, EasyApiGisConfig, ExecutionMode};
pub use pipeline::{PipelineController, PipelineSnapshot, PipelineState};
pub use schema::{generate_ddl, FieldMapping, InferredSchema, Srid};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");
