//! LLM client abstraction layer
//!
//! A trait-based abstraction for LLM communication so the schema inferrer can
//! run against a real provider (through `genai`) or a scripted mock.

mod client;
mod error;
mod genai;
mod mock;
mod types;

pub use client::LLMClient;
pub use error::LlmError;
pub use self::genai::{provider_has_credentials, GenAIClient, API_BASE_URL_ENV};
pub use mock::{MockLLMClient, MockResponse};
pub use types::{ChatMessage, LLMRequest, LLMResponse, MessageRole};
