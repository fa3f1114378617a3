//! API Format handling
//!
//! Abstracts the differences between the OpenAI, Anthropic, Google and
//! Hugging Face request/response shapes. Each format handler knows how to
//! build a request body and where the reply text lives in the response.

pub mod anthropic;
pub mod google;
pub mod huggingface;
pub mod openai;

use serde_json::Value;

use crate::ai::providers::ApiFormat;
use crate::ai::types::ChatMessage;

/// Trait for handling different API formats
pub trait FormatHandler: Send + Sync {
    /// Build the complete request body (caller extras are merged afterwards)
    fn build_request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        options: &RequestOptions,
    ) -> Value;

    /// Pull the assistant's reply text out of a response.
    /// `None` means the response did not have the expected shape.
    fn extract_text(&self, response: &Value) -> Option<String>;
}

/// Options for building API requests
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions<'a> {
    pub max_tokens: usize,
    pub system_prompt: Option<&'a str>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl Default for RequestOptions<'_> {
    fn default() -> Self {
        Self {
            max_tokens: crate::constants::ai::MAX_OUTPUT_TOKENS,
            system_prompt: None,
            temperature: None,
            top_p: None,
        }
    }
}

/// Select the appropriate format handler based on API format
pub fn get_format_handler(format: ApiFormat) -> Box<dyn FormatHandler> {
    match format {
        ApiFormat::OpenAI => Box::new(openai::OpenAIFormat),
        ApiFormat::Anthropic => Box::new(anthropic::AnthropicFormat),
        ApiFormat::Google => Box::new(google::GoogleFormat),
        ApiFormat::HuggingFace => Box::new(huggingface::HuggingFaceFormat),
    }
}

/// Shallow-merge `extra` into the top level of `body`, overwriting existing keys
pub fn merge_extra(body: &mut Value, extra: &serde_json::Map<String, Value>) {
    if let Some(obj) = body.as_object_mut() {
        for (key, value) in extra {
            obj.insert(key.clone(), value.clone());
        }
    }
}
