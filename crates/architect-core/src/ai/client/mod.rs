//! AI Client module
//!
//! One HTTP client type serves every vendor; the provider's API format picks
//! the request/response handler:
//! - OpenAI chat/completions
//! - Anthropic messages
//! - Google generateContent
//! - Hugging Face inference

pub mod config;
pub mod core;
pub mod simple;

// Re-export main types
pub use config::CallOptions;
pub use core::{build_http_client, AiClient};
