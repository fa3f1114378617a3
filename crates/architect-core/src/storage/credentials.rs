//! Multi-provider credential storage
//!
//! API keys live in a JSON file keyed by `"{provider}_api_key"`. Adapters and
//! the selector resolve keys through one [`CredentialSource`], which by default
//! checks the stored secrets first and the provider's environment variable second.

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::ai::providers::ProviderId;
use crate::paths;

/// Anything that can produce an API key for a provider
pub trait CredentialSource: Send + Sync {
    /// API key for `provider`, or `None` when unconfigured
    fn api_key(&self, provider: ProviderId) -> Option<String>;

    fn has_key(&self, provider: ProviderId) -> bool {
        self.api_key(provider).is_some()
    }
}

/// Storage for API keys indexed by secret key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(flatten)]
    keys: HashMap<String, String>,
}

impl CredentialStore {
    /// Load credentials from a specific path; a missing file is an empty store
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let store: CredentialStore = serde_json::from_str(&contents)?;
        Ok(store)
    }

    /// Save credentials to a specific path
    ///
    /// Writes to a temp file then renames over the original. On Unix the
    /// file is restricted to 0600 before the rename.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&temp_path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut permissions = fs::metadata(&temp_path)?.permissions();
            permissions.set_mode(0o600);
            fs::set_permissions(&temp_path, permissions)
                .map_err(|e| anyhow::anyhow!("Failed to set secure file permissions: {}", e))?;
        }

        fs::rename(&temp_path, path)?;

        #[cfg(windows)]
        {
            tracing::warn!(
                "Windows: File permissions not set - credentials may be accessible to other users"
            );
        }

        tracing::debug!("Credentials saved atomically to {:?}", path);
        Ok(())
    }

    /// Get API key for a provider
    pub fn get(&self, provider: ProviderId) -> Option<&String> {
        self.keys.get(&provider.secret_key())
    }

    /// Set API key for a provider
    pub fn set(&mut self, provider: ProviderId, key: String) {
        self.keys.insert(provider.secret_key(), key);
    }

    /// Remove API key for a provider
    pub fn remove(&mut self, provider: ProviderId) -> bool {
        self.keys.remove(&provider.secret_key()).is_some()
    }

    /// Get all providers with stored API keys, in registry order
    pub fn configured_providers(&self) -> Vec<ProviderId> {
        ProviderId::all()
            .iter()
            .filter(|p| self.get(**p).is_some())
            .copied()
            .collect()
    }
}

impl CredentialSource for CredentialStore {
    fn api_key(&self, provider: ProviderId) -> Option<String> {
        self.get(provider).filter(|k| !k.is_empty()).cloned()
    }
}

/// Persistent, shareable secret store
///
/// The only writer of stored API keys. An in-memory store (no path) is used
/// by tests and by callers that manage persistence themselves.
pub struct SecretStore {
    path: Option<PathBuf>,
    store: RwLock<CredentialStore>,
}

impl SecretStore {
    /// Open the store at the default credentials path
    pub fn open_default() -> Result<Self> {
        Self::open(paths::credentials_path())
    }

    /// Open (or lazily create) the store at `path`
    pub fn open(path: PathBuf) -> Result<Self> {
        let store = CredentialStore::load_from_path(&path)?;
        Ok(Self {
            path: Some(path),
            store: RwLock::new(store),
        })
    }

    /// Non-persistent store seeded with `store`
    pub fn in_memory(store: CredentialStore) -> Self {
        Self {
            path: None,
            store: RwLock::new(store),
        }
    }

    /// Store a key and persist it
    ///
    /// The in-memory store only changes once the file write succeeded.
    pub fn set(&self, provider: ProviderId, key: String) -> Result<()> {
        let mut store = self.store.write();
        let mut updated = store.clone();
        updated.set(provider, key);
        self.persist(&updated)?;
        *store = updated;
        Ok(())
    }

    /// Remove a key and persist the change
    pub fn remove(&self, provider: ProviderId) -> Result<bool> {
        let mut store = self.store.write();
        let mut updated = store.clone();
        if !updated.remove(provider) {
            return Ok(false);
        }
        self.persist(&updated)?;
        *store = updated;
        Ok(true)
    }

    pub fn configured_providers(&self) -> Vec<ProviderId> {
        self.store.read().configured_providers()
    }

    fn persist(&self, store: &CredentialStore) -> Result<()> {
        match &self.path {
            Some(path) => store.save_to_path(path),
            None => Ok(()),
        }
    }
}

impl CredentialSource for SecretStore {
    fn api_key(&self, provider: ProviderId) -> Option<String> {
        self.store.read().api_key(provider)
    }
}

/// Reads `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `GOOGLE_AI_API_KEY`, `HUGGINGFACE_API_KEY`
#[derive(Debug, Clone, Copy)]
pub struct EnvCredentials {
    lookup: fn(&str) -> Option<String>,
}

impl EnvCredentials {
    /// Resolve variables through `lookup` instead of the process environment
    pub fn with_lookup(lookup: fn(&str) -> Option<String>) -> Self {
        Self { lookup }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self, provider: ProviderId) -> Option<String> {
        (self.lookup)(provider.env_var()).filter(|k| !k.trim().is_empty())
    }
}

/// Tries each source in order; first key found wins
#[derive(Clone, Default)]
pub struct LayeredCredentials {
    sources: Vec<Arc<dyn CredentialSource>>,
}

impl LayeredCredentials {
    pub fn new(sources: Vec<Arc<dyn CredentialSource>>) -> Self {
        Self { sources }
    }

    /// Stored secrets first, then environment variables
    pub fn secrets_then_env(secrets: Arc<SecretStore>) -> Self {
        Self::secrets_then(secrets, EnvCredentials::default())
    }

    /// Stored secrets first, then `env`
    pub fn secrets_then(secrets: Arc<SecretStore>, env: EnvCredentials) -> Self {
        let sources: Vec<Arc<dyn CredentialSource>> = vec![secrets, Arc::new(env)];
        Self::new(sources)
    }
}

impl CredentialSource for LayeredCredentials {
    fn api_key(&self, provider: ProviderId) -> Option<String> {
        self.sources.iter().find_map(|s| s.api_key(provider))
    }
}
