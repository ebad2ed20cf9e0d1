//! Configuration management for the hardstyle watcher.
//!
//! Configuration comes from environment variables, optionally seeded from
//! `.env` files:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080";
pub const DEFAULT_MARKET: &str = "NL";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Loads `.env` files into the process environment.
///
/// Looks at the working directory first, then at
/// `hardstyle-watcher/.env` in the platform-specific local data directory:
/// - Linux: `~/.local/share/hardstyle-watcher/.env`
/// - macOS: `~/Library/Application Support/hardstyle-watcher/.env`
/// - Windows: `%LOCALAPPDATA%/hardstyle-watcher/.env`
///
/// Variables already present in the environment are never overwritten, and
/// a missing file is not an error.
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created or an
/// existing `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            return Err(e.to_string());
        }
    }

    let path = env_file_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

/// Location of the per-user data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("hardstyle-watcher");
    path
}

fn env_file_path() -> PathBuf {
    data_dir().join(".env")
}

/// Log directory from `HARDSTYLE_WATCHER_LOG_DIR`, `logs` when unset.
pub fn log_dir() -> PathBuf {
    log_dir_from(env::var("HARDSTYLE_WATCHER_LOG_DIR").ok())
}

/// `value` as a log directory, falling back to `logs` when unset or blank.
pub fn log_dir_from(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}

/// Everything a sync run needs to know about its environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub playlist_id: String,
    /// Only consumed by the browser-based bootstrap of a refresh token.
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
    pub access_token: Option<String>,
    pub market: String,
    pub api_url: String,
    pub token_url: String,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let market = get("SPOTIFY_MARKET").unwrap_or_else(|| DEFAULT_MARKET.to_string());
        if market.len() != 2 || !market.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid {
                name: "SPOTIFY_MARKET",
                reason: format!("{market:?} is not an ISO 3166-1 alpha-2 country code"),
            });
        }

        Ok(Self {
            client_id: require("SPOTIFY_CLIENT_ID")?,
            client_secret: require("SPOTIFY_CLIENT_SECRET")?,
            playlist_id: require("SPOTIFY_PLAYLIST_ID")?,
            redirect_uri: get("SPOTIFY_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            refresh_token: get("SPOTIFY_REFRESH_TOKEN"),
            access_token: get("SPOTIFY_ACCESS_TOKEN"),
            market: market.to_ascii_uppercase(),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            token_url: get("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        })
    }
}
