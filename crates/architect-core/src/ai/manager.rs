//! Provider registry and selection
//!
//! Holds one adapter per vendor in a fixed order and decides which one serves
//! the next request. The configured default is tried first; if it is inside
//! its rate-limit window the registry is scanned (wrapping) for the next
//! provider that is both outside its window and has a credential.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::ai::adapter::ProviderAdapter;
use crate::ai::client::{build_http_client, AiClient};
use crate::ai::providers::ProviderId;
use crate::ai::rate_limit::RateLimiter;
use crate::config::Settings;
use crate::constants;
use crate::error::{ArchitectError, Result};
use crate::notify::{LogNotifier, NoticeLevel, Notifier};
use crate::storage::{CredentialSource, LayeredCredentials, SecretStore};

/// Outcome of one selection
pub enum Selection {
    /// Chosen provider; its usage has been recorded
    Selected(Arc<dyn ProviderAdapter>),
    /// Selection failed and `adapter` is the built-in default. Nothing recorded.
    Degraded {
        adapter: Arc<dyn ProviderAdapter>,
        reason: ArchitectError,
    },
    /// Every candidate was rate limited or unconfigured
    Exhausted { reason: ArchitectError },
}

impl Selection {
    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Selected(_))
    }

    pub fn reason(&self) -> Option<&ArchitectError> {
        match self {
            Selection::Selected(_) => None,
            Selection::Degraded { reason, .. } | Selection::Exhausted { reason } => Some(reason),
        }
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::Selected(a) => f.debug_tuple("Selected").field(&a.name()).finish(),
            Selection::Degraded { adapter, reason } => f
                .debug_struct("Degraded")
                .field("adapter", &adapter.name())
                .field("reason", reason)
                .finish(),
            Selection::Exhausted { reason } => {
                f.debug_struct("Exhausted").field("reason", reason).finish()
            }
        }
    }
}

/// Snapshot of one provider for listings
#[derive(Debug, Clone)]
pub struct ProviderStatus {
    pub id: ProviderId,
    pub name: &'static str,
    pub is_default: bool,
    pub configured: bool,
    pub rate_limited: bool,
    pub retry_after: Option<Duration>,
}

pub struct ProviderManager {
    registry: Vec<Arc<dyn ProviderAdapter>>,
    credentials: Arc<dyn CredentialSource>,
    secrets: Arc<SecretStore>,
    default_provider: RwLock<String>,
    pinned_provider: RwLock<Option<String>>,
    settings_file: Option<PathBuf>,
    limiter: Mutex<RateLimiter>,
    notifier: Arc<dyn Notifier>,
}

pub type SharedProviderManager = Arc<ProviderManager>;

impl ProviderManager {
    /// Create a manager over `registry` (in fallback order)
    pub fn new(
        registry: Vec<Arc<dyn ProviderAdapter>>,
        credentials: Arc<dyn CredentialSource>,
        secrets: Arc<SecretStore>,
    ) -> Result<Self> {
        if registry.is_empty() {
            return Err(ArchitectError::Configuration(
                "No providers registered".to_string(),
            ));
        }
        Ok(Self {
            registry,
            credentials,
            secrets,
            default_provider: RwLock::new(constants::ai::DEFAULT_PROVIDER.to_string()),
            pinned_provider: RwLock::new(None),
            settings_file: None,
            limiter: Mutex::new(RateLimiter::default()),
            notifier: Arc::new(LogNotifier),
        })
    }

    /// Build the standard four-vendor registry from settings
    ///
    /// Adapters and the selector share one credential source: stored secrets
    /// first, then environment variables.
    pub fn from_settings(settings: &Settings, secrets: Arc<SecretStore>) -> Result<Self> {
        let credentials: Arc<dyn CredentialSource> =
            Arc::new(LayeredCredentials::secrets_then_env(secrets.clone()));
        let http = build_http_client(&settings.http);

        let registry: Vec<Arc<dyn ProviderAdapter>> = ProviderId::all()
            .iter()
            .filter_map(|id| settings.provider_config(*id))
            .map(|config| {
                Arc::new(AiClient::new(config, http.clone(), credentials.clone()))
                    as Arc<dyn ProviderAdapter>
            })
            .collect();

        Ok(Self::new(registry, credentials, secrets)?
            .with_default_provider(settings.default_provider_name())
            .with_rate_limiter(RateLimiter::from_settings(&settings.rate_limit)))
    }

    pub fn with_default_provider(self, name: &str) -> Self {
        *self.default_provider.write() = name.trim().to_string();
        self
    }

    /// Re-read `default_provider` from this settings file on every selection
    pub fn with_settings_file(mut self, path: PathBuf) -> Self {
        self.settings_file = Some(path);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Mutex::new(limiter);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Name consulted first on every selection.
    ///
    /// A pinned name wins. Otherwise the settings file (if any) is re-read so
    /// edits apply without a restart; an unreadable file keeps the last value.
    pub fn default_provider_name(&self) -> String {
        if let Some(pinned) = self.pinned_provider.read().as_ref() {
            return pinned.clone();
        }
        if let Some(path) = &self.settings_file {
            match Settings::load_from_path(path) {
                Ok(mut settings) => {
                    settings.apply_env();
                    let name = settings.default_provider_name().to_string();
                    *self.default_provider.write() = name.clone();
                    return name;
                }
                Err(e) => warn!("Could not re-read settings from {:?}: {}", path, e),
            }
        }
        self.default_provider.read().clone()
    }

    /// Pin the default provider, overriding the settings file
    pub fn set_default_provider(&self, name: &str) {
        *self.pinned_provider.write() = Some(name.trim().to_string());
    }

    /// Registered adapters, in fallback order
    pub fn providers(&self) -> &[Arc<dyn ProviderAdapter>] {
        &self.registry
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderAdapter>> {
        let name = name.trim().to_ascii_lowercase();
        self.registry.iter().find(|a| a.name() == name).cloned()
    }

    /// Adapter returned whenever selection cannot succeed
    pub fn builtin_default(&self) -> Arc<dyn ProviderAdapter> {
        self.get(constants::ai::DEFAULT_PROVIDER)
            .unwrap_or_else(|| self.registry[0].clone())
    }

    /// Choose the provider for the next request.
    ///
    /// The rate-limit check and the usage record happen under one lock, so
    /// concurrent selections cannot both take the same window.
    pub fn select(&self) -> Selection {
        let name = self.default_provider_name();
        let mut limiter = self.limiter.lock();

        let Some(index) = self.position(&name) else {
            warn!("Default provider \"{}\" not registered", name);
            self.notifier.warn(&format!(
                "Provider \"{}\" not found, using {}",
                name,
                constants::ai::DEFAULT_PROVIDER
            ));
            return Selection::Degraded {
                adapter: self.builtin_default(),
                reason: ArchitectError::Configuration(format!("Provider \"{}\" not found", name)),
            };
        };

        let mut chosen = self.registry[index].clone();
        if limiter.is_limited(chosen.id()) {
            self.notifier.warn(&format!(
                "{} is rate limited, switching to the next available provider",
                chosen.id()
            ));
            match self.next_eligible(&limiter, Some(index)) {
                Some(next) => chosen = next,
                None => {
                    return Selection::Exhausted {
                        reason: ArchitectError::ProvidersExhausted,
                    }
                }
            }
        }

        if !self.credentials.has_key(chosen.id()) {
            return Selection::Degraded {
                adapter: self.builtin_default(),
                reason: ArchitectError::Configuration(format!(
                    "API key not configured for {}. Set {} or run `architect configure`.",
                    chosen.name(),
                    chosen.id().env_var()
                )),
            };
        }

        limiter.record(chosen.id());
        info!("Selected provider {}", chosen.name());
        Selection::Selected(chosen)
    }

    /// Adapter for the next request; never fails.
    ///
    /// Failures are reported through the notifier and the built-in default
    /// adapter is returned in their place.
    pub fn current_provider(&self) -> Arc<dyn ProviderAdapter> {
        match self.select() {
            Selection::Selected(adapter) => adapter,
            Selection::Degraded { adapter, reason } => {
                self.notifier.error(&reason.user_message());
                adapter
            }
            Selection::Exhausted { reason } => {
                self.notifier.error(&reason.user_message());
                self.builtin_default()
            }
        }
    }

    /// Next provider after `current` (wrapping) that is outside its window and
    /// configured. `current` itself is never returned; an unknown name starts
    /// the scan at the first registered provider.
    pub fn try_next_provider(&self, current: &str) -> Option<Arc<dyn ProviderAdapter>> {
        let limiter = self.limiter.lock();
        self.next_eligible(&limiter, self.position(current))
    }

    pub fn is_rate_limited(&self, provider: ProviderId) -> bool {
        self.limiter.lock().is_limited(provider)
    }

    /// Record a call against `provider` at the current instant
    pub fn record_call(&self, provider: ProviderId) {
        self.limiter.lock().record(provider);
    }

    pub fn last_call(&self, provider: ProviderId) -> Option<Instant> {
        self.limiter.lock().last_call(provider)
    }

    /// Store an API key for `provider`
    pub fn configure(&self, provider: ProviderId, api_key: &str) -> Result<()> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ArchitectError::Validation(
                "API key cannot be empty.".to_string(),
            ));
        }
        self.secrets
            .set(provider, api_key.to_string())
            .map_err(|e| {
                ArchitectError::Configuration(format!("Failed to save API key: {}", e))
            })?;
        self.notifier.notify(
            NoticeLevel::Info,
            &format!("API key for {} has been saved.", provider),
        );
        Ok(())
    }

    /// Delete the stored key for `provider`. Environment variables are untouched.
    pub fn remove_credential(&self, provider: ProviderId) -> Result<bool> {
        self.secrets.remove(provider).map_err(|e| {
            ArchitectError::Configuration(format!("Failed to remove API key: {}", e))
        })
    }

    pub fn status(&self) -> Vec<ProviderStatus> {
        let default = self.default_provider_name();
        let limiter = self.limiter.lock();
        self.registry
            .iter()
            .map(|adapter| {
                let id = adapter.id();
                ProviderStatus {
                    id,
                    name: adapter.name(),
                    is_default: adapter.name() == default,
                    configured: self.credentials.has_key(id),
                    rate_limited: limiter.is_limited(id),
                    retry_after: limiter.retry_after(id),
                }
            })
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim().to_ascii_lowercase();
        self.registry.iter().position(|a| a.name() == name)
    }

    fn next_eligible(
        &self,
        limiter: &RateLimiter,
        current: Option<usize>,
    ) -> Option<Arc<dyn ProviderAdapter>> {
        let len = self.registry.len();
        let start = current.map(|i| i + 1).unwrap_or(0);

        (0..len)
            .map(|offset| (start + offset) % len)
            .filter(|index| Some(*index) != current)
            .map(|index| &self.registry[index])
            .find(|adapter| {
                let id = adapter.id();
                let eligible = !limiter.is_limited(id) && self.credentials.has_key(id);
                debug!(
                    "Fallback candidate {}: {}",
                    adapter.name(),
                    if eligible { "eligible" } else { "skipped" }
                );
                eligible
            })
            .cloned()
    }
}

impl std::fmt::Debug for ProviderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderManager")
            .field(
                "registry",
                &self.registry.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("default_provider", &*self.default_provider.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::adapter::mock::MockProvider;
    use crate::notify::recording::RecordingNotifier;
    use crate::storage::CredentialStore;

    struct Fixture {
        manager: ProviderManager,
        secrets: Arc<SecretStore>,
        notifier: Arc<RecordingNotifier>,
    }

    /// All four vendors as mocks, with keys for `configured` only
    fn fixture(default: &str, configured: &[ProviderId]) -> Fixture {
        let mut store = CredentialStore::default();
        for id in configured {
            store.set(*id, format!("{}-key", id.storage_key()));
        }
        let secrets = Arc::new(SecretStore::in_memory(store));
        let credentials: Arc<dyn CredentialSource> = secrets.clone();
        let registry: Vec<Arc<dyn ProviderAdapter>> = ProviderId::all()
            .iter()
            .map(|id| Arc::new(MockProvider::replying(*id, "ok")) as Arc<dyn ProviderAdapter>)
            .collect();
        let notifier = Arc::new(RecordingNotifier::default());

        let manager = ProviderManager::new(registry, credentials, secrets.clone())
            .unwrap()
            .with_default_provider(default)
            .with_notifier(notifier.clone());
        Fixture {
            manager,
            secrets,
            notifier,
        }
    }

    fn all_configured() -> Vec<ProviderId> {
        ProviderId::all().to_vec()
    }

    #[tokio::test(start_paused = true)]
    async fn test_selects_default_and_records() {
        let f = fixture("openai", &all_configured());

        match f.manager.select() {
            Selection::Selected(adapter) => assert_eq!(adapter.name(), "openai"),
            other => panic!("expected selection, got {:?}", other),
        }
        assert!(f.manager.is_rate_limited(ProviderId::OpenAI));
        assert!(!f.manager.is_rate_limited(ProviderId::Google));
    }

    #[tokio::test(start_paused = true)]
    async fn test_limited_default_falls_through_to_eligible_provider() {
        // openai limited, anthropic unconfigured, google eligible
        let f = fixture(
            "openai",
            &[ProviderId::OpenAI, ProviderId::Google, ProviderId::HuggingFace],
        );
        f.manager.record_call(ProviderId::OpenAI);
        let openai_before = f.manager.last_call(ProviderId::OpenAI);

        let adapter = f.manager.current_provider();
        assert_eq!(adapter.name(), "google");

        assert_eq!(f.manager.last_call(ProviderId::OpenAI), openai_before);
        assert!(f.manager.last_call(ProviderId::Anthropic).is_none());
        assert!(f.manager.last_call(ProviderId::Google).is_some());
        assert!(f.manager.last_call(ProviderId::HuggingFace).is_none());
        assert_eq!(f.notifier.messages(NoticeLevel::Warning).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_wraps_around_registry() {
        // google is last; scan wraps to huggingface (unconfigured) then openai
        let f = fixture("google", &[ProviderId::Google, ProviderId::OpenAI]);
        f.manager.record_call(ProviderId::Google);

        assert_eq!(f.manager.current_provider().name(), "openai");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_returns_builtin_default() {
        let f = fixture("openai", &[ProviderId::OpenAI]);
        f.manager.record_call(ProviderId::OpenAI);

        let selection = f.manager.select();
        assert!(matches!(
            selection,
            Selection::Exhausted {
                reason: ArchitectError::ProvidersExhausted
            }
        ));

        let adapter = f.manager.current_provider();
        assert_eq!(adapter.name(), "huggingface");
        assert!(f.manager.last_call(ProviderId::HuggingFace).is_none());
        assert_eq!(
            f.notifier.messages(NoticeLevel::Error),
            vec!["All providers are rate limited or unconfigured".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_default_degrades_without_recording() {
        let f = fixture("mistral", &all_configured());

        let selection = f.manager.select();
        match &selection {
            Selection::Degraded { adapter, reason } => {
                assert_eq!(adapter.name(), "huggingface");
                assert!(reason.is_configuration());
            }
            other => panic!("expected degraded selection, got {:?}", other),
        }
        for id in ProviderId::all() {
            assert!(!f.manager.is_rate_limited(*id));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfigured_default_degrades() {
        let f = fixture("anthropic", &[ProviderId::OpenAI]);

        let selection = f.manager.select();
        assert!(matches!(
            selection.reason(),
            Some(ArchitectError::Configuration(msg)) if msg.contains("ANTHROPIC_API_KEY")
        ));
        assert!(!f.manager.is_rate_limited(ProviderId::Anthropic));
        assert_eq!(f.manager.current_provider().name(), "huggingface");
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_restores_default() {
        let f = fixture("openai", &all_configured());

        assert_eq!(f.manager.current_provider().name(), "openai");
        // Second request inside the hour goes elsewhere
        assert_eq!(f.manager.current_provider().name(), "anthropic");

        tokio::time::advance(Duration::from_secs(3600)).await;
        assert!(!f.manager.is_rate_limited(ProviderId::OpenAI));
        assert_eq!(f.manager.current_provider().name(), "openai");
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_next_provider_never_returns_current() {
        let f = fixture("openai", &all_configured());

        let next = f.manager.try_next_provider("openai").unwrap();
        assert_eq!(next.name(), "anthropic");

        f.manager.record_call(ProviderId::Anthropic);
        f.manager.record_call(ProviderId::Google);
        f.manager.record_call(ProviderId::HuggingFace);
        assert!(f.manager.try_next_provider("openai").is_none());

        // try_next_provider does not record usage
        assert!(!f.manager.is_rate_limited(ProviderId::OpenAI));
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_next_provider_unknown_starts_at_first() {
        let f = fixture("openai", &all_configured());
        assert_eq!(
            f.manager.try_next_provider("nope").unwrap().name(),
            "huggingface"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_selections_do_not_share_a_window() {
        let f = fixture("openai", &[ProviderId::OpenAI]);
        let manager = Arc::new(f.manager);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.select().is_selected() })
            })
            .collect();
        let mut selected = 0;
        for handle in handles {
            if handle.await.unwrap() {
                selected += 1;
            }
        }
        assert_eq!(selected, 1);
    }

    #[test]
    fn test_configure_persists_and_enables_provider() {
        let f = fixture("google", &[]);
        assert!(!f.manager.status()[3].configured);

        f.manager.configure(ProviderId::Google, "  g-key  ").unwrap();
        assert_eq!(
            f.secrets.api_key(ProviderId::Google).as_deref(),
            Some("g-key")
        );
        let google = f
            .manager
            .status()
            .into_iter()
            .find(|s| s.id == ProviderId::Google)
            .unwrap();
        assert!(google.configured);
        assert!(google.is_default);

        assert!(f.manager.remove_credential(ProviderId::Google).unwrap());
        assert!(!f.secrets.has_key(ProviderId::Google));
    }

    #[test]
    fn test_configure_rejects_blank_key() {
        let f = fixture("google", &[]);
        let err = f.manager.configure(ProviderId::Google, "   ").unwrap_err();
        assert!(matches!(err, ArchitectError::Validation(_)));
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        let secrets = Arc::new(SecretStore::in_memory(CredentialStore::default()));
        let credentials: Arc<dyn CredentialSource> = secrets.clone();
        assert!(ProviderManager::new(Vec::new(), credentials, secrets).is_err());
    }

    #[test]
    fn test_from_settings_builds_full_registry() {
        let secrets = Arc::new(SecretStore::in_memory(CredentialStore::default()));
        let settings = Settings {
            default_provider: Some("anthropic".to_string()),
            ..Default::default()
        };
        let manager = ProviderManager::from_settings(&settings, secrets).unwrap();

        let names: Vec<&str> = manager.providers().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["huggingface", "openai", "anthropic", "google"]);
        assert_eq!(manager.default_provider_name(), "anthropic");
        assert_eq!(
            manager.get("openai").unwrap().base_url(),
            "https://api.openai.com/v1"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_provider_follows_settings_file_edits() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "default_provider = \"openai\"\n").unwrap();

        let f = fixture("huggingface", &all_configured());
        let manager = f.manager.with_settings_file(path.clone());
        assert_eq!(manager.current_provider().name(), "openai");

        std::fs::write(&path, "default_provider = \"google\"\n").unwrap();
        assert_eq!(manager.default_provider_name(), "google");
        assert_eq!(manager.current_provider().name(), "google");

        // A broken edit keeps the last good value
        std::fs::write(&path, "default_provider = [").unwrap();
        assert_eq!(manager.default_provider_name(), "google");

        // Removing the file falls back to the built-in default
        std::fs::remove_file(&path).unwrap();
        assert_eq!(manager.default_provider_name(), "huggingface");
    }

    #[test]
    fn test_pinned_provider_wins_over_settings_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "default_provider = \"openai\"\n").unwrap();

        let f = fixture("huggingface", &all_configured());
        let manager = f.manager.with_settings_file(path);
        manager.set_default_provider("anthropic");
        assert_eq!(manager.default_provider_name(), "anthropic");
    }
}
