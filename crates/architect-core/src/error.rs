//! Error taxonomy shared by adapters, the selector and the chat session

use thiserror::Error;

use crate::ai::providers::ProviderId;

/// Message surfaced when a chat turn fails, regardless of the underlying cause
pub const CHAT_FAILURE_MESSAGE: &str = "Failed to get response from AI provider";

/// Core error type
#[derive(Debug, Error)]
pub enum ArchitectError {
    /// Caller supplied unusable input (e.g. an empty prompt)
    #[error("{0}")]
    Validation(String),

    /// Missing credential or unknown provider name
    #[error("{0}")]
    Configuration(String),

    /// No provider is both outside its rate-limit window and configured
    #[error("All providers are rate limited or unconfigured")]
    ProvidersExhausted,

    /// Network, HTTP or response-shape failure from a vendor.
    /// `message` is user-safe; `detail` is for logs only.
    #[error("{message}")]
    Upstream {
        provider: ProviderId,
        message: String,
        detail: String,
    },

    /// Session-level wrapper handed to the presentation layer
    #[error("{0}")]
    ChatFailure(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file could not be parsed
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ArchitectError {
    /// Build the generic upstream error for a vendor, keeping the detail for logs
    pub fn upstream(provider: ProviderId, detail: impl Into<String>) -> Self {
        ArchitectError::Upstream {
            provider,
            message: format!(
                "Failed to get a response from {}. Please check your API key and network connection.",
                provider
            ),
            detail: detail.into(),
        }
    }

    /// Session-level failure with the fixed generic message
    pub fn chat_failure() -> Self {
        ArchitectError::ChatFailure(CHAT_FAILURE_MESSAGE.to_string())
    }

    /// Text safe to show in the UI
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Whether the user should be routed to the provider configuration flow
    pub fn is_configuration(&self) -> bool {
        matches!(self, ArchitectError::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, ArchitectError>;
