//! Application constants and configuration defaults
//!
//! Centralized location for magic numbers and default values

use std::time::Duration;

/// HTTP client configuration
pub mod http {
    use super::*;

    /// Connection timeout for HTTP requests
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Whole-request timeout; responses are never streamed so this bounds the full reply
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// User agent sent with every vendor request
    pub const USER_AGENT: &str = concat!("Architect/", env!("CARGO_PKG_VERSION"));
}

/// AI/LLM configuration
pub mod ai {
    use super::*;

    /// Provider used when nothing is configured, and the last-resort fallback
    pub const DEFAULT_PROVIDER: &str = "huggingface";

    /// Default maximum output tokens (Anthropic requires the field)
    pub const MAX_OUTPUT_TOKENS: usize = 1024;

    /// Cooldown after a provider is selected
    pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60 * 60);

    /// Selections allowed per provider inside one window
    pub const RATE_LIMIT_MAX_CALLS: usize = 1;

    /// Prefix sent ahead of file contents for the analyze flow
    pub const ANALYZE_PROMPT: &str = "Analyze this code:\n\n";
}

/// Filesystem layout
pub mod fs {
    /// Config directory name under the user's home
    pub const CONFIG_DIR_NAME: &str = ".architect";

    /// Environment variable overriding the config directory
    pub const HOME_ENV: &str = "ARCHITECT_HOME";

    /// Environment variable overriding the configured default provider
    pub const DEFAULT_PROVIDER_ENV: &str = "ARCHITECT_DEFAULT_PROVIDER";
}
