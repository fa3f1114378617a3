//! Anthropic API format handler
//!
//! Messages API: `{model, max_tokens, messages, system?}` in, text blocks of
//! `content[]` out.

use serde_json::{json, Value};

use super::{FormatHandler, RequestOptions};
use crate::ai::types::ChatMessage;

/// API version header value required by the Messages API
pub const API_VERSION: &str = "2023-06-01";

/// Anthropic format handler
pub struct AnthropicFormat;

impl FormatHandler for AnthropicFormat {
    fn build_request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &RequestOptions,
    ) -> Value {
        let converted: Vec<Value> = messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();

        let mut body = json!({
            "model": model,
            "messages": converted,
            "max_tokens": options.max_tokens,
        });

        if let Some(system) = options.system_prompt {
            body["system"] = json!(system);
        }
        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(top_p) = options.top_p {
            body["top_p"] = json!(top_p);
        }

        body
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        let blocks = response.get("content").and_then(|c| c.as_array())?;
        if blocks.is_empty() {
            return None;
        }

        // Only text blocks carry the reply; skip thinking/tool blocks
        let text = blocks
            .iter()
            .filter(|block| block.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|block| block.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        Some(text.trim().to_string())
    }
}
