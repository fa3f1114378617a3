//! Filesystem locations for settings, credentials and logs

use std::path::PathBuf;

use crate::constants;

/// Root config directory (`$ARCHITECT_HOME` or `~/.architect`)
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(constants::fs::HOME_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::fs::CONFIG_DIR_NAME)
}

pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

pub fn credentials_path() -> PathBuf {
    config_dir().join("credentials.json")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("config.toml")
}
