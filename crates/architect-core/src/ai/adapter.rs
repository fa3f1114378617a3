//! Uniform call contract for vendor adapters

use async_trait::async_trait;

use crate::ai::client::{AiClient, CallOptions};
use crate::ai::providers::ProviderId;
use crate::error::Result;

/// One vendor's chat endpoint behind a uniform interface.
///
/// Implementations do not retry; failover is the selector's job.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Stable identifier used as registry and credential key
    fn name(&self) -> &'static str {
        self.id().storage_key()
    }

    /// Vendor API root
    fn base_url(&self) -> &str;

    /// Send `input` (with `options.history` as context) and return the reply text.
    ///
    /// Fails with `Validation` on blank input, `Configuration` when no key
    /// resolves, and `Upstream` for any HTTP, network or response-shape failure.
    async fn call_api(&self, input: &str, options: &CallOptions) -> Result<String>;
}

#[async_trait]
impl ProviderAdapter for AiClient {
    fn id(&self) -> ProviderId {
        self.provider_id()
    }

    fn base_url(&self) -> &str {
        &self.config().base_url
    }

    async fn call_api(&self, input: &str, options: &CallOptions) -> Result<String> {
        self.call_simple(input, options).await
    }
}
