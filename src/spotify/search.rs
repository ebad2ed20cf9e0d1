use crate::{
    error::ServiceError,
    types::{SearchCandidate, SearchResponse, TrackQuery},
};

use super::SpotifyClient;

/// Searches the catalog for tracks matching `query`.
///
/// Results are restricted to tracks available in `market` and capped at
/// `limit`, best match first. The album release date of each hit is passed
/// through unparsed, since its precision varies (`2024`, `2024-03`,
/// `2024-03-15`).
pub async fn search_track(
    client: &SpotifyClient,
    query: &TrackQuery,
    market: &str,
    limit: u32,
) -> Result<Vec<SearchCandidate>, ServiceError> {
    let url = format!("{api}/search", api = client.api_url);
    let q = query.to_query_string();
    let limit = limit.to_string();

    let response = client
        .send(|http| {
            http.get(&url).query(&[
                ("q", q.as_str()),
                ("type", "track"),
                ("limit", limit.as_str()),
                ("market", market),
            ])
        })
        .await?
        .json::<SearchResponse>()
        .await
        .map_err(|e| ServiceError::Decode(e.to_string()))?;

    Ok(response
        .tracks
        .items
        .into_iter()
        .map(|track| SearchCandidate {
            identifier: track.uri,
            release_date: track.album.release_date,
        })
        .collect())
}
