//! AI provider configuration
//!
//! Defines provider identities, per-provider request configuration, and the
//! built-in provider registry for the four supported vendors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::constants;
use crate::error::ArchitectError;

/// Unique identifier for each supported provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    #[default]
    #[serde(rename = "huggingface")]
    HuggingFace,
    #[serde(rename = "openai")]
    OpenAI,
    Anthropic,
    Google,
}

impl ProviderId {
    /// Get all available provider IDs
    /// Order is the registry order and drives fallback rotation
    pub fn all() -> &'static [ProviderId] {
        &[
            ProviderId::HuggingFace, // Built-in default, always first
            ProviderId::OpenAI,
            ProviderId::Anthropic,
            ProviderId::Google,
        ]
    }

    /// Stable name used as registry key and in settings
    pub fn storage_key(&self) -> &'static str {
        match self {
            ProviderId::HuggingFace => "huggingface",
            ProviderId::OpenAI => "openai",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Google => "google",
        }
    }

    /// Key under which the API key lives in the credential store
    pub fn secret_key(&self) -> String {
        format!("{}_api_key", self.storage_key())
    }

    /// Environment variable consulted when the credential store has no key
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::HuggingFace => "HUGGINGFACE_API_KEY",
            ProviderId::OpenAI => "OPENAI_API_KEY",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::Google => "GOOGLE_AI_API_KEY",
        }
    }

    /// Look up a provider by its storage key
    pub fn from_name(name: &str) -> Option<ProviderId> {
        let name = name.trim().to_ascii_lowercase();
        Self::all().iter().copied().find(|p| p.storage_key() == name)
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::HuggingFace => write!(f, "Hugging Face"),
            ProviderId::OpenAI => write!(f, "OpenAI"),
            ProviderId::Anthropic => write!(f, "Anthropic"),
            ProviderId::Google => write!(f, "Google AI"),
        }
    }
}

impl FromStr for ProviderId {
    type Err = ArchitectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| ArchitectError::Configuration(format!("Provider \"{}\" not found", s)))
    }
}

/// How to send the API key in requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthHeader {
    /// Use `Authorization: Bearer <key>` header
    #[default]
    Bearer,
    /// Use `x-api-key: <key>` header (native Anthropic style)
    XApiKey,
}

/// Request/response shape a provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiFormat {
    /// Chat Completions (`{base}/chat/completions`)
    OpenAI,
    /// Messages API (`{base}/messages`)
    Anthropic,
    /// Gemini generateContent (`{base}/models/{model}:generateContent`)
    Google,
    /// Inference API (`{base}/models/{model}`)
    HuggingFace,
}

/// Configuration for an AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique identifier
    pub id: ProviderId,
    /// Display name
    pub name: String,
    /// Short description for UI
    pub description: String,
    /// API root (without trailing slash)
    pub base_url: String,
    /// Model ID sent with every request
    pub model: String,
    /// How to send authentication
    pub auth_header: AuthHeader,
    /// Request/response shape
    pub api_format: ApiFormat,
    /// Default output token cap
    pub max_tokens: usize,
    /// Extra headers to send with requests
    #[serde(default)]
    pub custom_headers: HashMap<String, String>,
}

impl ProviderConfig {
    /// Full URL of the single endpoint this provider is called on
    pub fn endpoint_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.api_format {
            ApiFormat::OpenAI => format!("{}/chat/completions", base),
            ApiFormat::Anthropic => format!("{}/messages", base),
            ApiFormat::Google => format!("{}/models/{}:generateContent", base, self.model),
            ApiFormat::HuggingFace => format!("{}/models/{}", base, self.model),
        }
    }
}

/// Lazily initialized built-in provider configurations, in registry order
static BUILTIN_PROVIDERS: LazyLock<Vec<ProviderConfig>> = LazyLock::new(|| {
    vec![
        ProviderConfig {
            id: ProviderId::HuggingFace,
            name: "Hugging Face".to_string(),
            description: "Hosted inference (Qwen Coder)".to_string(),
            base_url: "https://api-inference.huggingface.co".to_string(),
            model: "Qwen/Qwen2.5-Coder-32B-Instruct".to_string(),
            auth_header: AuthHeader::Bearer,
            api_format: ApiFormat::HuggingFace,
            max_tokens: constants::ai::MAX_OUTPUT_TOKENS,
            custom_headers: HashMap::new(),
        },
        ProviderConfig {
            id: ProviderId::OpenAI,
            name: "OpenAI".to_string(),
            description: "GPT models via Chat Completions".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4".to_string(),
            auth_header: AuthHeader::Bearer,
            api_format: ApiFormat::OpenAI,
            max_tokens: constants::ai::MAX_OUTPUT_TOKENS,
            custom_headers: HashMap::new(),
        },
        ProviderConfig {
            id: ProviderId::Anthropic,
            name: "Anthropic".to_string(),
            description: "Claude models via the Messages API".to_string(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-opus-20240229".to_string(),
            auth_header: AuthHeader::Bearer,
            api_format: ApiFormat::Anthropic,
            max_tokens: constants::ai::MAX_OUTPUT_TOKENS,
            custom_headers: HashMap::new(),
        },
        ProviderConfig {
            id: ProviderId::Google,
            name: "Google AI".to_string(),
            description: "Gemini models via generateContent".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            auth_header: AuthHeader::Bearer,
            api_format: ApiFormat::Google,
            max_tokens: constants::ai::MAX_OUTPUT_TOKENS,
            custom_headers: HashMap::new(),
        },
    ]
});

/// Get all built-in provider configurations (cached, no allocation)
pub fn builtin_providers() -> &'static [ProviderConfig] {
    &BUILTIN_PROVIDERS
}

/// Get a specific provider configuration by ID
pub fn get_provider(id: ProviderId) -> Option<&'static ProviderConfig> {
    BUILTIN_PROVIDERS.iter().find(|p| p.id == id)
}
