use std::collections::HashMap;

use hardstyle_watcher::config::Config;
use hardstyle_watcher::error::ServiceError;
use hardstyle_watcher::management::{AppCredentials, TokenManager, is_expired};
use hardstyle_watcher::types::Token;

// Helper function to create a test token
fn create_test_token(access_token: &str, obtained_at: u64, expires_in: u64) -> Token {
    Token {
        access_token: access_token.to_string(),
        refresh_token: "refresh".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_in,
        obtained_at,
    }
}

fn app() -> AppCredentials {
    AppCredentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        token_url: "http://localhost:1/api/token".to_string(),
    }
}

fn config(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<&str, &str> = vars.iter().copied().collect();
    Config::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap()
}

#[test]
fn test_is_expired_with_margin() {
    let token = create_test_token("access", 1_000, 3_600);

    assert!(!is_expired(&token, 1_000));
    assert!(!is_expired(&token, 4_359));
    // Four minutes before the reported expiry counts as expired
    assert!(is_expired(&token, 4_360));
    assert!(is_expired(&token, 5_000));
}

#[test]
fn test_is_expired_without_access_token() {
    let token = create_test_token("", 1_000, 3_600);

    assert!(is_expired(&token, 1_000));
}

#[test]
fn test_is_expired_unknown_expiry() {
    // expires_in of zero must not underflow
    let token = create_test_token("access", 0, 0);

    assert!(is_expired(&token, 0));
}

#[test]
fn test_token_from_config() {
    let config = config(&[
        ("SPOTIFY_CLIENT_ID", "client"),
        ("SPOTIFY_CLIENT_SECRET", "secret"),
        ("SPOTIFY_PLAYLIST_ID", "playlist"),
        ("SPOTIFY_REFRESH_TOKEN", "refresh"),
        ("SPOTIFY_ACCESS_TOKEN", "access"),
    ]);

    let token = TokenManager::token_from_config(&config).unwrap();

    assert_eq!(token.refresh_token, "refresh");
    assert_eq!(token.access_token, "access");
    // Refreshed on first use
    assert!(is_expired(&token, 1));
}

#[test]
fn test_token_from_config_requires_refresh_token() {
    let config = config(&[
        ("SPOTIFY_CLIENT_ID", "client"),
        ("SPOTIFY_CLIENT_SECRET", "secret"),
        ("SPOTIFY_PLAYLIST_ID", "playlist"),
    ]);

    let err = TokenManager::token_from_config(&config).unwrap_err();

    assert!(matches!(err, ServiceError::Credentials(_)));
}

#[tokio::test]
async fn test_token_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("token.json");
    let manager = TokenManager::new(app(), create_test_token("access", 1_000, 3_600))
        .with_cache_path(path.clone());

    manager.persist().await.unwrap();
    let cached = TokenManager::read_cache(&path).await.unwrap();

    assert_eq!(cached.access_token, "access");
    assert_eq!(cached.refresh_token, "refresh");
    assert_eq!(cached.obtained_at, 1_000);
    assert_eq!(cached.expires_in, 3_600);
}

#[tokio::test]
async fn test_read_cache_missing_file() {
    let dir = tempfile::tempdir().unwrap();

    let result = TokenManager::read_cache(&dir.path().join("token.json")).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_valid_token_is_served_without_refresh() {
    let now = chrono::Utc::now().timestamp() as u64;
    // The token URL is unreachable, a refresh attempt would fail
    let manager = TokenManager::new(app(), create_test_token("fresh", now, 3_600));

    assert_eq!(manager.access_token().await.unwrap(), "fresh");
}
