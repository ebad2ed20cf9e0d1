use thiserror::Error;

/// A page could not be fetched, even after the retry policy gave up.
#[derive(Debug, Error)]
#[error("failed to fetch {url}: {source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("missing {field} in {context}")]
    MissingField {
        field: &'static str,
        context: String,
    },

    #[error("invalid release date {value:?} (expected {format}): {source}")]
    InvalidDate {
        value: String,
        format: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid selector {0}")]
    Selector(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("access token rejected by the playlist service")]
    Unauthorized,

    #[error("playlist service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request to playlist service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected playlist service response: {0}")]
    Decode(String),

    #[error("credentials unavailable: {0}")]
    Credentials(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("search still unauthorized after refreshing credentials")]
    Unauthorized,

    #[error("credential refresh failed: {0}")]
    Refresh(#[source] ServiceError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("removing stale tracks failed: {0}")]
    Remove(#[source] ServiceError),

    #[error("adding new tracks failed: {0}")]
    Add(#[source] ServiceError),
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("reading the playlist failed: {0}")]
    Playlist(#[source] ServiceError),

    #[error("fetching tracks from {source_name} failed: {error}")]
    Scrape {
        source_name: &'static str,
        #[source]
        error: ScrapeError,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
