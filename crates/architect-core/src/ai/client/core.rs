//! Core AI Client
//!
//! The HTTP adapter for one vendor: owns the provider configuration, the
//! format handler for its API shape, and a handle to the shared credential source.

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, error};

use crate::ai::format::{anthropic, get_format_handler, FormatHandler};
use crate::ai::providers::{ApiFormat, AuthHeader, ProviderConfig, ProviderId};
use crate::config::HttpSettings;
use crate::error::{ArchitectError, Result};
use crate::storage::CredentialSource;

/// Build the shared HTTP client
///
/// Falls back to a default client if the builder rejects the configuration.
pub fn build_http_client(settings: &HttpSettings) -> Client {
    Client::builder()
        .user_agent(crate::constants::http::USER_AGENT)
        .connect_timeout(settings.connect_timeout())
        .timeout(settings.request_timeout())
        .build()
        .unwrap_or_else(|e| {
            error!("Failed to build HTTP client: {}. Using default client.", e);
            Client::new()
        })
}

/// AI API client for a single provider
pub struct AiClient {
    http: Client,
    config: ProviderConfig,
    format: Box<dyn FormatHandler>,
    credentials: Arc<dyn CredentialSource>,
}

impl AiClient {
    pub fn new(
        config: ProviderConfig,
        http: Client,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            format: get_format_handler(config.api_format),
            http,
            config,
            credentials,
        }
    }

    /// Get the provider ID for this client
    pub fn provider_id(&self) -> ProviderId {
        self.config.id
    }

    /// Get the current configuration
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub(crate) fn format(&self) -> &dyn FormatHandler {
        self.format.as_ref()
    }

    /// Resolve this provider's API key or fail with a configuration error
    pub(crate) fn api_key(&self) -> Result<String> {
        self.credentials.api_key(self.config.id).ok_or_else(|| {
            ArchitectError::Configuration(format!(
                "API key not configured for {}. Set {} or run `architect configure`.",
                self.config.id.storage_key(),
                self.config.id.env_var()
            ))
        })
    }

    /// Build a request with proper authentication headers
    pub(crate) fn build_request(&self, url: &str, api_key: &str) -> reqwest::RequestBuilder {
        let mut request = self.http.post(url);

        match self.config.auth_header {
            AuthHeader::Bearer => {
                request = request.header("authorization", format!("Bearer {}", api_key));
            }
            AuthHeader::XApiKey => {
                request = request.header("x-api-key", api_key);
            }
        }
        debug!(
            "Using {:?} authentication for {}",
            self.config.auth_header, self.config.id
        );

        if self.config.api_format == ApiFormat::Anthropic {
            request = request.header("anthropic-version", anthropic::API_VERSION);
        }

        for (name, value) in &self.config.custom_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        request.header("content-type", "application/json")
    }

    /// Turn a non-success response into an upstream error, logging the vendor detail
    pub(crate) async fn handle_error_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        error!(
            "{} API error response: {} - {}",
            self.config.id, status, error_text
        );
        Err(ArchitectError::upstream(
            self.config.id,
            format!("HTTP {}: {}", status, error_text),
        ))
    }
}

impl std::fmt::Debug for AiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiClient")
            .field("provider", &self.config.id)
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
