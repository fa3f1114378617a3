//! OpenAI API format handler
//!
//! Chat Completions: `{model, messages: [{role, content}]}` in,
//! `choices[0].message.content` out.

use serde_json::{json, Value};

use super::{FormatHandler, RequestOptions};
use crate::ai::types::ChatMessage;

/// OpenAI format handler
pub struct OpenAIFormat;

impl FormatHandler for OpenAIFormat {
    fn build_request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &RequestOptions,
    ) -> Value {
        let mut converted: Vec<Value> = Vec::with_capacity(messages.len() + 1);

        // System prompt goes first as its own message
        if let Some(system) = options.system_prompt {
            converted.push(json!({"role": "system", "content": system}));
        }
        converted.extend(
            messages
                .iter()
                .map(|m| json!({"role": m.role.as_str(), "content": m.content})),
        );

        let mut body = json!({
            "model": model,
            "messages": converted,
        });

        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(top_p) = options.top_p {
            body["top_p"] = json!(top_p);
        }

        body
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        response
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|t| t.as_str())
            .map(|t| t.trim().to_string())
    }
}
