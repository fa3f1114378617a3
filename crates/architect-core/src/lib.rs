//! Architect Core - Shared library for the Architect coding assistant
//!
//! This crate provides everything except the terminal front end:
//! - Provider adapters for Hugging Face, OpenAI, Anthropic and Google
//! - Rate-limit aware provider selection with failover
//! - Credential storage and settings
//! - The conversation session and the webview message bridge

pub mod ai;
pub mod bridge;
pub mod config;
pub mod constants;
pub mod error;
pub mod notify;
pub mod paths;
pub mod session;
pub mod storage;

// Re-exports for convenience
pub use ai::client::{AiClient, CallOptions};
pub use ai::manager::{ProviderManager, Selection};
pub use ai::providers::ProviderId;
pub use ai::types::{ChatMessage, Role};
pub use config::Settings;
pub use error::{ArchitectError, Result};
pub use session::{ChatSession, FailedTurnPolicy};
pub use storage::SecretStore;
