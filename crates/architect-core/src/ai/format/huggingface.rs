//! Hugging Face Inference API format handler
//!
//! Text generation takes a single `inputs` string, so conversation history is
//! not forwarded; only the latest user turn is sent.

use serde_json::{json, Value};

use super::{FormatHandler, RequestOptions};
use crate::ai::types::{ChatMessage, Role};

/// Hugging Face format handler
pub struct HuggingFaceFormat;

impl FormatHandler for HuggingFaceFormat {
    fn build_request_body(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        options: &RequestOptions,
    ) -> Value {
        let input = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let mut body = json!({ "inputs": input });

        let mut parameters = serde_json::Map::new();
        if let Some(temp) = options.temperature {
            parameters.insert("temperature".into(), json!(temp));
        }
        if let Some(top_p) = options.top_p {
            parameters.insert("top_p".into(), json!(top_p));
        }
        if !parameters.is_empty() {
            parameters.insert("max_new_tokens".into(), json!(options.max_tokens));
            body["parameters"] = Value::Object(parameters);
        }

        body
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        // The API answers either `{generated_text}` or `[{generated_text}]`
        let item = match response {
            Value::Array(items) => items.first()?,
            other => other,
        };
        item.get("generated_text")
            .and_then(|t| t.as_str())
            .map(|t| t.trim().to_string())
    }
}
