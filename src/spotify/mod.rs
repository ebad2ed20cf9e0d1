//! # Spotify Integration Module
//!
//! Implements [`PlaylistService`] on top of the Spotify Web API. This is the
//! only place that knows about Spotify endpoints, payload shapes and status
//! codes; the sync core only talks to the port.
//!
//! ## Endpoints
//!
//! - `GET /playlists/{id}/tracks` - current playlist contents, paginated
//! - `POST /playlists/{id}/tracks` - add tracks, at most 100 per request
//! - `DELETE /playlists/{id}/tracks` - remove tracks, at most 100 per request
//! - `GET /search` - field-filtered track search
//! - `POST /api/token` - refresh token exchange (see [`auth`])
//!
//! ## Error Handling
//!
//! - `401 Unauthorized` becomes [`ServiceError::Unauthorized`] so callers can
//!   refresh and retry
//! - `429 Too Many Requests` is retried after the `Retry-After` delay, as long
//!   as that delay is at most two minutes
//! - every other non-success status becomes [`ServiceError::Status`]

pub mod auth;
pub mod playlist;
pub mod search;

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

use crate::{
    config::Config,
    error::ServiceError,
    management::TokenManager,
    service::PlaylistService,
    types::{PlaylistItem, SearchCandidate, TrackQuery},
    warning,
};

/// Spotify accepts at most this many tracks per playlist mutation.
pub const MAX_ITEMS_PER_REQUEST: usize = 100;

const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const MAX_RETRY_AFTER_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    playlist_id: String,
    tokens: TokenManager,
}

impl SpotifyClient {
    pub fn new(
        api_url: impl Into<String>,
        playlist_id: impl Into<String>,
        tokens: TokenManager,
    ) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
            playlist_id: playlist_id.into(),
            tokens,
        }
    }

    pub fn from_config(config: &Config, tokens: TokenManager) -> Self {
        Self::new(config.api_url.clone(), config.playlist_id.clone(), tokens)
    }

    fn playlist_tracks_url(&self) -> String {
        format!(
            "{api}/playlists/{id}/tracks",
            api = self.api_url,
            id = self.playlist_id
        )
    }

    /// Sends an authenticated request built by `build` and checks its status.
    ///
    /// `build` is called again for every rate-limit retry, since a request
    /// builder cannot be reused once sent.
    async fn send<F>(&self, build: F) -> Result<Response, ServiceError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut rate_limited = 0;

        loop {
            let token = self.tokens.access_token().await?;
            let response = build(&self.http).bearer_auth(token).send().await?;

            match response.status() {
                status if status.is_success() => return Ok(response),
                StatusCode::UNAUTHORIZED => return Err(ServiceError::Unauthorized),
                StatusCode::TOO_MANY_REQUESTS if rate_limited < MAX_RATE_LIMIT_RETRIES => {
                    let retry_after = retry_after_secs(&response);
                    if retry_after > MAX_RETRY_AFTER_SECS {
                        warning!(
                            "Retry after has reached an abnormal high of {} seconds. Try again later.",
                            retry_after
                        );
                        return Err(status_error(response).await);
                    }
                    rate_limited += 1;
                    sleep(Duration::from_secs(retry_after)).await;
                }
                _ => return Err(status_error(response).await),
            }
        }
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(1)
}

async fn status_error(response: Response) -> ServiceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ServiceError::Status { status, body }
}

/// Identifiers of `items` in sorted order, split into request-sized chunks.
pub fn batches(items: &HashSet<PlaylistItem>) -> Vec<Vec<String>> {
    let mut ids: Vec<&PlaylistItem> = items.iter().collect();
    ids.sort();
    ids.chunks(MAX_ITEMS_PER_REQUEST)
        .map(|chunk| chunk.iter().map(|item| item.id().to_string()).collect())
        .collect()
}

#[async_trait]
impl PlaylistService for SpotifyClient {
    async fn get_playlist(&self) -> Result<HashSet<PlaylistItem>, ServiceError> {
        playlist::get_items(self).await
    }

    async fn search_track(
        &self,
        query: &TrackQuery,
        market: &str,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, ServiceError> {
        search::search_track(self, query, market, limit).await
    }

    async fn add_items(&self, items: &HashSet<PlaylistItem>) -> Result<(), ServiceError> {
        playlist::add_items(self, items).await
    }

    async fn remove_items(&self, items: &HashSet<PlaylistItem>) -> Result<(), ServiceError> {
        playlist::remove_items(self, items).await
    }

    async fn refresh_credentials(&self) -> Result<(), ServiceError> {
        self.tokens.refresh().await
    }
}
