use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{config::Config, error::ServiceError, spotify, types::Token, warning};

/// Seconds before the reported expiry at which a token counts as expired.
const EXPIRY_MARGIN: u64 = 240;

/// Client credentials used to authenticate refresh requests.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

/// Shared access/refresh token pair of one run.
///
/// Clones share the same token; a refresh through any clone is seen by all
/// of them. Refreshes are serialized by the inner mutex.
#[derive(Debug, Clone)]
pub struct TokenManager {
    token: Arc<Mutex<Token>>,
    app: AppCredentials,
    http: Client,
    cache_path: Option<PathBuf>,
}

impl TokenManager {
    pub fn new(app: AppCredentials, token: Token) -> Self {
        TokenManager {
            token: Arc::new(Mutex::new(token)),
            app,
            http: Client::new(),
            cache_path: None,
        }
    }

    /// Persists refreshed tokens to `path`.
    pub fn with_cache_path(mut self, path: PathBuf) -> Self {
        self.cache_path = Some(path);
        self
    }

    /// Builds the manager for a run.
    ///
    /// A cached token from an earlier run wins over the environment, because
    /// it carries the most recently issued access token.
    pub async fn load(config: &Config) -> Result<Self, ServiceError> {
        let app = AppCredentials {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: config.token_url.clone(),
        };
        let cache_path = Self::token_path();

        let token = match Self::read_cache(&cache_path).await {
            Ok(token) if !token.refresh_token.is_empty() => token,
            _ => Self::token_from_config(config)?,
        };

        Ok(Self::new(app, token).with_cache_path(cache_path))
    }

    pub fn token_from_config(config: &Config) -> Result<Token, ServiceError> {
        let refresh_token = config.refresh_token.clone().ok_or_else(|| {
            ServiceError::Credentials("no refresh token; set SPOTIFY_REFRESH_TOKEN".to_string())
        })?;

        // No known expiry: the first access_token() call refreshes it.
        Ok(Token {
            access_token: config.access_token.clone().unwrap_or_default(),
            refresh_token,
            scope: String::new(),
            expires_in: 0,
            obtained_at: 0,
        })
    }

    pub async fn read_cache(path: &PathBuf) -> Result<Token, String> {
        let content = async_fs::read_to_string(path)
            .await
            .map_err(|e| e.to_string())?;
        serde_json::from_str(&content).map_err(|e| e.to_string())
    }

    pub async fn persist(&self) -> Result<(), String> {
        let Some(path) = &self.cache_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = {
            let token = self.token.lock().await;
            serde_json::to_string_pretty(&*token).map_err(|e| e.to_string())?
        };
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing it first when it is about to expire.
    pub async fn access_token(&self) -> Result<String, ServiceError> {
        let expired = {
            let token = self.token.lock().await;
            is_expired(&token, Utc::now().timestamp() as u64)
        };

        if expired {
            self.refresh().await?;
        }

        Ok(self.token.lock().await.access_token.clone())
    }

    /// Exchanges the refresh token for a new access token.
    pub async fn refresh(&self) -> Result<(), ServiceError> {
        {
            let mut token = self.token.lock().await;
            let response =
                spotify::auth::refresh_token(&self.http, &self.app, &token.refresh_token).await?;

            token.access_token = response.access_token;
            if let Some(refresh_token) = response.refresh_token.filter(|t| !t.is_empty()) {
                token.refresh_token = refresh_token;
            }
            if let Some(scope) = response.scope {
                token.scope = scope;
            }
            token.expires_in = response.expires_in.unwrap_or(3600);
            token.obtained_at = Utc::now().timestamp() as u64;
        }

        if let Err(e) = self.persist().await {
            warning!("Failed to save token to cache: {}", e);
        }

        Ok(())
    }

    fn token_path() -> PathBuf {
        let mut path = crate::config::data_dir();
        path.push("cache/token.json");
        path
    }
}

/// Whether `token` expires within the safety margin as of `now` (unix seconds).
pub fn is_expired(token: &Token, now: u64) -> bool {
    if token.access_token.is_empty() {
        return true;
    }
    let expires_at = token.obtained_at.saturating_add(token.expires_in);
    now >= expires_at.saturating_sub(EXPIRY_MARGIN)
}
