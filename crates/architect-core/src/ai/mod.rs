//! AI provider layer
//!
//! Talks to Hugging Face, OpenAI, Anthropic and Google through one adapter
//! contract, and picks which of them serves each request.

pub mod adapter;
pub mod client;
pub mod format;
pub mod manager;
pub mod providers;
pub mod rate_limit;
pub mod types;

pub use adapter::ProviderAdapter;
pub use client::{AiClient, CallOptions};
pub use manager::{ProviderManager, ProviderStatus, Selection, SharedProviderManager};
