use chrono::NaiveDate;

use crate::{
    error::{ResolveError, ServiceError},
    info,
    service::PlaylistService,
    types::{PlaylistItem, SearchCandidate, TrackQuery, TrackRecord},
    utils::parse_service_date,
    warning,
};

pub const DEFAULT_SEARCH_LIMIT: u32 = 5;

/// Outcome of resolving one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The source already linked the track; no search was made.
    Trusted(PlaylistItem),
    /// The top search result.
    Matched(PlaylistItem),
    /// The search came back empty.
    NoMatch,
    /// The top result was released before the cutoff.
    Stale {
        identifier: String,
        release_date: NaiveDate,
    },
}

impl Resolution {
    pub fn item(self) -> Option<PlaylistItem> {
        match self {
            Resolution::Trusted(item) | Resolution::Matched(item) => Some(item),
            Resolution::NoMatch | Resolution::Stale { .. } => None,
        }
    }
}

/// Maps track records to playlist identifiers.
pub struct TrackResolver<'a> {
    service: &'a dyn PlaylistService,
    market: String,
    limit: u32,
}

impl<'a> TrackResolver<'a> {
    pub fn new(service: &'a dyn PlaylistService, market: impl Into<String>, limit: u32) -> Self {
        Self {
            service,
            market: market.into(),
            limit,
        }
    }

    /// Resolves `track` to a playlist item.
    ///
    /// An identifier embedded by the source is trusted as is. Otherwise the
    /// top search result is used, unless its own release date is before
    /// `from_date`: fuzzy search happily returns an older release with a
    /// similar name. A result whose date cannot be read at day precision is
    /// accepted.
    ///
    /// An expired access token is refreshed once and the search repeated
    /// once.
    pub async fn resolve(
        &self,
        track: &TrackRecord,
        from_date: NaiveDate,
    ) -> Result<Resolution, ResolveError> {
        if let Some(external_id) = &track.external_id {
            return Ok(Resolution::Trusted(PlaylistItem::new(external_id.clone())));
        }

        info!("Gathering track uri for {}", track);
        let query = TrackQuery::for_track(track);
        let candidates = self.search(&query).await?;

        let Some(top) = candidates.into_iter().next() else {
            return Ok(Resolution::NoMatch);
        };

        let release_date = match top.release_date.as_deref() {
            Some(raw) => {
                let parsed = parse_service_date(raw);
                if parsed.is_none() {
                    warning!("Cannot parse release date {:?} of {}", raw, top.identifier);
                }
                parsed
            }
            None => None,
        };

        if let Some(release_date) = release_date.filter(|date| *date < from_date) {
            info!("Track {} is older than {}", track, from_date);
            return Ok(Resolution::Stale {
                identifier: top.identifier,
                release_date,
            });
        }

        info!("Gathered track uri {} for {}", top.identifier, track);
        Ok(Resolution::Matched(PlaylistItem::new(top.identifier)))
    }

    async fn search(&self, query: &TrackQuery) -> Result<Vec<SearchCandidate>, ResolveError> {
        match self.search_once(query).await {
            Err(ServiceError::Unauthorized) => {
                info!("Access token expired, refreshing token...");
                self.service
                    .refresh_credentials()
                    .await
                    .map_err(ResolveError::Refresh)?;

                match self.search_once(query).await {
                    Err(ServiceError::Unauthorized) => Err(ResolveError::Unauthorized),
                    other => Ok(other?),
                }
            }
            other => Ok(other?),
        }
    }

    async fn search_once(&self, query: &TrackQuery) -> Result<Vec<SearchCandidate>, ServiceError> {
        self.service
            .search_track(query, &self.market, self.limit)
            .await
    }
}
