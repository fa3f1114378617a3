//! Interactive provider configuration

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Password, Select};

use architect_core::ai::providers::builtin_providers;
use architect_core::{ProviderId, ProviderManager};

/// Store (or remove) an API key. Prompts for the provider when `name` is None.
pub fn run(manager: &ProviderManager, name: Option<&str>, remove: bool) -> Result<()> {
    let provider = match name {
        Some(name) => name.parse::<ProviderId>()?,
        None => pick_provider(manager)?,
    };

    if remove {
        if manager.remove_credential(provider)? {
            println!("Removed stored API key for {}.", provider);
        } else {
            println!("No stored API key for {}.", provider);
        }
        return Ok(());
    }

    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Enter API key for {}", provider))
        .interact()
        .context("Failed to read API key")?;
    manager.configure(provider, &key)?;
    Ok(())
}

fn pick_provider(manager: &ProviderManager) -> Result<ProviderId> {
    let status = manager.status();
    let items: Vec<String> = builtin_providers()
        .iter()
        .map(|p| {
            let configured = status.iter().any(|s| s.id == p.id && s.configured);
            provider_label(&p.name, &p.description, configured)
        })
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select AI provider to configure")
        .items(&items)
        .default(0)
        .interact()?;
    Ok(builtin_providers()[selection].id)
}

fn provider_label(name: &str, description: &str, configured: bool) -> String {
    if configured {
        format!("{} - {} (configured)", name, description)
    } else {
        format!("{} - {}", name, description)
    }
}
