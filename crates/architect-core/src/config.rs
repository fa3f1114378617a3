//! User settings
//!
//! Read from `~/.architect/config.toml`. Every field is optional; a missing
//! file yields the defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ai::providers::{get_provider, AuthHeader, ProviderConfig, ProviderId};
use crate::constants;
use crate::error::Result;
use crate::paths;
use crate::session::FailedTurnPolicy;

/// Top-level settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider consulted first on every selection
    pub default_provider: Option<String>,
    /// What happens to the user turn when a reply fails
    pub failed_turn: FailedTurnPolicy,
    pub rate_limit: RateLimitSettings,
    pub http: HttpSettings,
    /// Per-provider overrides keyed by storage name (`openai`, `google`, ...)
    pub providers: HashMap<String, ProviderOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub window_secs: u64,
    pub max_calls: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_secs: constants::ai::RATE_LIMIT_WINDOW.as_secs(),
            max_calls: constants::ai::RATE_LIMIT_MAX_CALLS,
        }
    }
}

impl RateLimitSettings {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: constants::http::CONNECT_TIMEOUT.as_secs(),
            request_timeout_secs: constants::http::REQUEST_TIMEOUT.as_secs(),
        }
    }
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Fields a user may override for one provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOverride {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub auth_header: Option<AuthHeader>,
    pub max_tokens: Option<usize>,
    pub headers: HashMap<String, String>,
}

impl Settings {
    /// Load from the default path and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from_path(&paths::settings_path())?;
        settings.apply_env();
        Ok(settings)
    }

    /// Load from a specific file; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)?;

        for name in settings.providers.keys() {
            if ProviderId::from_name(name).is_none() {
                warn!("Ignoring settings for unknown provider \"{}\"", name);
            }
        }
        Ok(settings)
    }

    /// `ARCHITECT_DEFAULT_PROVIDER` wins over the file
    pub fn apply_env(&mut self) {
        if let Ok(name) = std::env::var(constants::fs::DEFAULT_PROVIDER_ENV) {
            if !name.trim().is_empty() {
                self.default_provider = Some(name.trim().to_string());
            }
        }
    }

    /// Configured default provider name, or the built-in default
    pub fn default_provider_name(&self) -> &str {
        self.default_provider
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(constants::ai::DEFAULT_PROVIDER)
    }

    /// Built-in configuration for `id` with any user overrides applied
    pub fn provider_config(&self, id: ProviderId) -> Option<ProviderConfig> {
        let mut config = get_provider(id)?.clone();
        let Some(overrides) = self
            .providers
            .iter()
            .find(|(name, _)| ProviderId::from_name(name) == Some(id))
            .map(|(_, o)| o)
        else {
            return Some(config);
        };

        if let Some(model) = &overrides.model {
            config.model = model.clone();
        }
        if let Some(base_url) = &overrides.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(auth_header) = overrides.auth_header {
            config.auth_header = auth_header;
        }
        if let Some(max_tokens) = overrides.max_tokens {
            config.max_tokens = max_tokens;
        }
        config
            .custom_headers
            .extend(overrides.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load_from_path(&temp.path().join("config.toml")).unwrap();
        assert_eq!(settings.default_provider_name(), "huggingface");
        assert_eq!(settings.failed_turn, FailedTurnPolicy::Keep);
        assert_eq!(settings.rate_limit.window(), Duration::from_secs(3600));
        assert_eq!(settings.rate_limit.max_calls, 1);
        assert_eq!(settings.http.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_parse_full_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_provider = "openai"
failed_turn = "rollback"

[rate_limit]
window_secs = 60
max_calls = 5

[http]
connect_timeout_secs = 5

[providers.openai]
model = "gpt-4o"
base_url = "http://localhost:8080/v1"
auth_header = "x_api_key"
max_tokens = 2048
"#,
        )
        .unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.default_provider_name(), "openai");
        assert_eq!(settings.failed_turn, FailedTurnPolicy::Rollback);
        assert_eq!(settings.rate_limit.max_calls, 5);
        assert_eq!(settings.http.connect_timeout(), Duration::from_secs(5));
        // Unset fields in a present table keep their defaults
        assert_eq!(settings.http.request_timeout(), Duration::from_secs(120));

        let openai = settings.provider_config(ProviderId::OpenAI).unwrap();
        assert_eq!(openai.model, "gpt-4o");
        assert_eq!(openai.auth_header, AuthHeader::XApiKey);
        assert_eq!(openai.max_tokens, 2048);
        assert_eq!(openai.endpoint_url(), "http://localhost:8080/v1/chat/completions");

        let google = settings.provider_config(ProviderId::Google).unwrap();
        assert_eq!(google.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "default_provider = [").unwrap();
        assert!(Settings::load_from_path(&path).is_err());
    }

    #[test]
    fn test_blank_default_falls_back() {
        let settings = Settings {
            default_provider: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.default_provider_name(), "huggingface");
    }
}
