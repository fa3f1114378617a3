//! Wiring of settings, credentials, selector and session

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use architect_core::ai::manager::ProviderStatus;
use architect_core::bridge::MessageHandler;
use architect_core::notify::{NoticeLevel, Notifier};
use architect_core::{paths, ChatSession, ProviderManager, SecretStore, Settings};

use crate::terminal::ShellRunner;

/// Prints selector notices on stderr
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Info => eprintln!("{}", message),
            _ => eprintln!("[{}] {}", level, message),
        }
    }
}

pub struct App {
    pub manager: Arc<ProviderManager>,
    pub session: Arc<ChatSession>,
}

impl App {
    /// Load settings and stored credentials from the config directory
    pub fn load(provider_override: Option<&str>) -> Result<Self> {
        let settings = Settings::load()?;
        let secrets = Arc::new(SecretStore::open_default()?);
        Ok(Self::from_parts(
            &settings,
            secrets,
            Some(paths::settings_path()),
            provider_override,
        )?)
    }

    pub fn from_parts(
        settings: &Settings,
        secrets: Arc<SecretStore>,
        settings_file: Option<PathBuf>,
        provider_override: Option<&str>,
    ) -> architect_core::Result<Self> {
        let mut manager =
            ProviderManager::from_settings(settings, secrets)?.with_notifier(Arc::new(StderrNotifier));
        if let Some(path) = settings_file {
            manager = manager.with_settings_file(path);
        }
        if let Some(name) = provider_override {
            manager.set_default_provider(name);
        }
        let manager = Arc::new(manager);
        let session = Arc::new(ChatSession::new(manager.clone()).with_policy(settings.failed_turn));
        Ok(Self { manager, session })
    }

    pub fn message_handler(&self) -> MessageHandler {
        MessageHandler::new(self.session.clone(), Arc::new(ShellRunner))
    }
}

pub fn format_status(status: &ProviderStatus) -> String {
    let mut flags = Vec::new();
    if status.is_default {
        flags.push("default".to_string());
    }
    flags.push(if status.configured {
        "configured".to_string()
    } else {
        "no API key".to_string()
    });
    if status.rate_limited {
        match status.retry_after {
            Some(wait) => flags.push(format!("rate limited for {}s", wait.as_secs())),
            None => flags.push("rate limited".to_string()),
        }
    }
    format!("  {:<12} {:<13} {}", status.name, status.id.to_string(), flags.join(", "))
}

pub fn print_status(manager: &ProviderManager) {
    println!("Providers (in fallback order):");
    for status in manager.status() {
        println!("{}", format_status(&status));
    }
}
