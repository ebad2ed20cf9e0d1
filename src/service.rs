use std::collections::HashSet;

use async_trait::async_trait;

use crate::{
    error::ServiceError,
    types::{PlaylistItem, SearchCandidate, TrackQuery},
};

/// Port wrapping the playlist service capabilities the sync core relies on.
///
/// [`crate::spotify::SpotifyClient`] is the production implementation.
#[async_trait]
pub trait PlaylistService: Send + Sync {
    /// Current contents of the target playlist.
    async fn get_playlist(&self) -> Result<HashSet<PlaylistItem>, ServiceError>;

    /// Candidates for `query`, best match first.
    ///
    /// Fails with [`ServiceError::Unauthorized`] when the access token expired.
    async fn search_track(
        &self,
        query: &TrackQuery,
        market: &str,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, ServiceError>;

    async fn add_items(&self, items: &HashSet<PlaylistItem>) -> Result<(), ServiceError>;

    async fn remove_items(&self, items: &HashSet<PlaylistItem>) -> Result<(), ServiceError>;

    /// Exchanges the refresh token for a new access token.
    async fn refresh_credentials(&self) -> Result<(), ServiceError>;
}
