use std::collections::HashSet;

use crate::{
    error::ServiceError,
    types::{
        AddTracksRequest, PlaylistItem, PlaylistTracksResponse, RemoveTracksRequest,
        TrackRefPayload,
    },
};

use super::{SpotifyClient, batches};

/// Retrieves every track of the target playlist.
///
/// Follows the `next` links until the last page. Entries without a track
/// (removed or local files) are skipped.
pub async fn get_items(client: &SpotifyClient) -> Result<HashSet<PlaylistItem>, ServiceError> {
    let mut items = HashSet::new();
    let mut next = Some(format!(
        "{url}?fields=items(track(uri)),next&limit=100",
        url = client.playlist_tracks_url()
    ));

    while let Some(url) = next {
        let page = client
            .send(|http| http.get(&url))
            .await?
            .json::<PlaylistTracksResponse>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        items.extend(
            page.items
                .into_iter()
                .filter_map(|entry| entry.track)
                .map(|track| PlaylistItem::new(track.uri)),
        );
        next = page.next;
    }

    Ok(items)
}

pub async fn add_items(
    client: &SpotifyClient,
    items: &HashSet<PlaylistItem>,
) -> Result<(), ServiceError> {
    let url = client.playlist_tracks_url();
    for uris in batches(items) {
        let body = AddTracksRequest { uris };
        client.send(|http| http.post(&url).json(&body)).await?;
    }
    Ok(())
}

pub async fn remove_items(
    client: &SpotifyClient,
    items: &HashSet<PlaylistItem>,
) -> Result<(), ServiceError> {
    let url = client.playlist_tracks_url();
    for uris in batches(items) {
        let body = RemoveTracksRequest {
            tracks: uris.into_iter().map(|uri| TrackRefPayload { uri }).collect(),
        };
        client.send(|http| http.delete(&url).json(&body)).await?;
    }
    Ok(())
}
