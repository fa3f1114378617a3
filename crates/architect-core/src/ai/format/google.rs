//! Google/Gemini API format handler
//!
//! Handles conversion to Google AI API format (contents, parts, generationConfig).

use serde_json::{json, Value};

use super::{FormatHandler, RequestOptions};
use crate::ai::types::{ChatMessage, Role};

/// Google format handler
pub struct GoogleFormat;

impl FormatHandler for GoogleFormat {
    fn build_request_body(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        options: &RequestOptions,
    ) -> Value {
        let contents: Vec<Value> = messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                };
                json!({
                    "role": role,
                    "parts": [{"text": m.content}]
                })
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": options.max_tokens,
            }
        });

        if let Some(system) = options.system_prompt {
            body["systemInstruction"] = json!({
                "parts": [{"text": system}]
            });
        }
        if let Some(temp) = options.temperature {
            body["generationConfig"]["temperature"] = json!(temp);
        }
        if let Some(top_p) = options.top_p {
            body["generationConfig"]["topP"] = json!(top_p);
        }

        body
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        let parts = response
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())?;

        let text = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        Some(text.trim().to_string())
    }
}
