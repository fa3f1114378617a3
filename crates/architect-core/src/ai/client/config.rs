//! Per-call options
//!
//! Provider-agnostic knobs passed alongside each prompt.

use serde_json::{Map, Value};

use crate::ai::types::ChatMessage;

/// Call options for API requests
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Prior conversation; the prompt is appended unless it is already the last user turn
    pub history: Vec<ChatMessage>,
    /// Output token cap (defaults to the provider's configured value)
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub system_prompt: Option<String>,
    /// Raw fields merged into the top level of the request body last
    pub extra: Map<String, Value>,
}

impl CallOptions {
    pub fn with_history(history: Vec<ChatMessage>) -> Self {
        Self {
            history,
            ..Default::default()
        }
    }
}
