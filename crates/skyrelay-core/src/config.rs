//! Application configuration — `~/.skyrelay/config.json` plus env overrides.
//!
//! JSON on disk uses camelCase keys; Rust uses snake_case.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.skyrelay/config.json`
//! 3. Environment variables (override JSON)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ─────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────

/// Root configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

/// Telegram bot settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub token: String,
}

impl TelegramConfig {
    /// Whether a bot token is configured.
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Webhook server settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Publicly reachable base URL, registered as the webhook target
    /// (e.g. `"https://bot.example.com"`). Empty disables auto-registration.
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: String::new(),
        }
    }
}

/// Storage settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Store directory. Empty = `~/.skyrelay/store/`.
    pub dir: String,
}

impl StorageConfig {
    /// Resolved store directory, or `None` for the default location.
    pub fn dir_path(&self) -> Option<PathBuf> {
        if self.dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.dir))
        }
    }
}

// ─────────────────────────────────────────────
// Loader
// ─────────────────────────────────────────────

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be
/// parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    load_config_from_path(&config_path)
}

fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `SKYRELAY_<SECTION>__<FIELD>` (double underscore as
/// delimiter). `TELEGRAM_BOT_TOKEN` is accepted as the conventional alias
/// for the bot token.
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("TELEGRAM_BOT_TOKEN") {
        config.telegram.token = val;
    }
    if let Ok(val) = std::env::var("SKYRELAY_TELEGRAM__TOKEN") {
        config.telegram.token = val;
    }
    if let Ok(val) = std::env::var("SKYRELAY_SERVER__HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("SKYRELAY_SERVER__PORT") {
        if let Ok(p) = val.parse::<u16>() {
            config.server.port = p;
        }
    }
    if let Ok(val) = std::env::var("SKYRELAY_SERVER__PUBLIC_URL") {
        config.server.public_url = val;
    }
    if let Ok(val) = std::env::var("SKYRELAY_STORAGE__DIR") {
        config.storage.dir = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
