//! Simple (non-streaming) API calls
//!
//! One POST per prompt; the whole reply is read before returning.

use serde_json::Value;
use tracing::{debug, error};

use super::config::CallOptions;
use super::core::AiClient;
use crate::ai::format::{merge_extra, RequestOptions};
use crate::ai::types::turn_messages;
use crate::error::{ArchitectError, Result};

impl AiClient {
    /// Make a simple non-streaming API call and return the reply text
    pub async fn call_simple(&self, input: &str, options: &CallOptions) -> Result<String> {
        if input.trim().is_empty() {
            return Err(ArchitectError::Validation(
                "Input prompt cannot be empty.".to_string(),
            ));
        }

        let api_key = self.api_key()?;
        let config = self.config();
        let id = config.id;

        let messages = turn_messages(&options.history, input);
        let request_options = RequestOptions {
            max_tokens: options.max_tokens.unwrap_or(config.max_tokens),
            system_prompt: options.system_prompt.as_deref(),
            temperature: options.temperature,
            top_p: options.top_p,
        };
        let mut body = self
            .format()
            .build_request_body(&config.model, &messages, &request_options);
        merge_extra(&mut body, &options.extra);

        let url = config.endpoint_url();
        debug!(
            "{} call to {} (model: {}, {} messages)",
            id,
            url,
            config.model,
            messages.len()
        );

        let response = self
            .build_request(&url, &api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("{} request failed: {}", id, e);
                ArchitectError::upstream(id, e.to_string())
            })?;
        let response = self.handle_error_response(response).await?;

        let text = response.text().await.map_err(|e| {
            error!("{} response could not be read: {}", id, e);
            ArchitectError::upstream(id, e.to_string())
        })?;
        let json: Value = serde_json::from_str(&text).map_err(|e| {
            error!("{} returned non-JSON body: {} ({})", id, e, text);
            ArchitectError::upstream(id, e.to_string())
        })?;

        self.format().extract_text(&json).ok_or_else(|| {
            error!("{} API returned an invalid response: {}", id, json);
            ArchitectError::upstream(id, format!("{} API returned an invalid response", id))
        })
    }
}
