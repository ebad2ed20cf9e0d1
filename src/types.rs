use std::{
    fmt,
    hash::{Hash, Hasher},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

const SPOTIFY_TRACK_URI_PREFIX: &str = "spotify:track:";

/// Genre tag attached to a discovered release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Genre {
    Unknown,
    #[default]
    Hardstyle,
    Hardcore,
}

impl Genre {
    /// Value of the listing filter some sources accept, `None` means unfiltered.
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            Genre::Unknown => None,
            Genre::Hardstyle => Some("Hardstyle"),
            Genre::Hardcore => Some("Hardcore"),
        }
    }
}

/// A release discovered on one of the listing sites.
///
/// Two records are the same track when `title` and `artist_name` are equal,
/// byte for byte. Date, genre and external id do not take part in equality,
/// so a set of records keeps one entry per title/artist pair.
#[derive(Debug, Clone)]
pub struct TrackRecord {
    pub title: String,
    pub artist_name: String,
    pub release_date: Option<NaiveDate>,
    pub genre: Genre,
    pub external_id: Option<String>,
}

impl TrackRecord {
    pub fn new(title: impl Into<String>, artist_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist_name: artist_name.into(),
            release_date: None,
            genre: Genre::default(),
            external_id: None,
        }
    }

    pub fn with_release_date(mut self, release_date: NaiveDate) -> Self {
        self.release_date = Some(release_date);
        self
    }

    pub fn with_genre(mut self, genre: Genre) -> Self {
        self.genre = genre;
        self
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }
}

impl PartialEq for TrackRecord {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.artist_name == other.artist_name
    }
}

impl Eq for TrackRecord {}

impl Hash for TrackRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.artist_name.hash(state);
    }
}

impl fmt::Display for TrackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artist_name.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.artist_name, self.title)
        }
    }
}

/// One entry of the target playlist, identified only by its track identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaylistItem {
    id: String,
}

impl PlaylistItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Builds an item from any of the ways Spotify tracks get referenced.
    ///
    /// Accepts a `spotify:track:<id>` URI, an `https://open.spotify.com/track/<id>?si=..`
    /// link (optionally with an `intl-xx` segment) or a bare track id. The
    /// result always uses the URI form, which is what the playlist endpoints
    /// return. Anything else, such as album links or empty strings, is `None`.
    pub fn from_spotify_ref(reference: &str) -> Option<Self> {
        let reference = reference.trim();

        let id = if let Some(id) = reference.strip_prefix(SPOTIFY_TRACK_URI_PREFIX) {
            id
        } else if let Some(rest) = strip_open_spotify(reference) {
            let path = rest.split(['?', '#']).next().unwrap_or(rest);
            let mut segments = path.split('/').filter(|s| !s.is_empty());
            let mut kind = segments.next()?;
            if kind.starts_with("intl-") {
                kind = segments.next()?;
            }
            if kind != "track" {
                return None;
            }
            let id = segments.next()?;
            if segments.next().is_some() {
                return None;
            }
            id
        } else {
            reference
        };

        is_track_id(id).then(|| Self::new(format!("{SPOTIFY_TRACK_URI_PREFIX}{id}")))
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn strip_open_spotify(reference: &str) -> Option<&str> {
    ["https://open.spotify.com/", "http://open.spotify.com/", "open.spotify.com/"]
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
}

/// Spotify ids are base62.
fn is_track_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

impl fmt::Display for PlaylistItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Structured search terms for one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub title: String,
    pub artist: String,
}

impl TrackQuery {
    pub fn for_track(track: &TrackRecord) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist_name.clone(),
        }
    }

    /// Field-filtered query string, `artist:` is left out for unknown artists.
    pub fn to_query_string(&self) -> String {
        if self.artist.trim().is_empty() {
            format!("track:{}", self.title)
        } else {
            format!("track:{} artist:{}", self.title, self.artist)
        }
    }
}

impl fmt::Display for TrackQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// A search hit as the resolver sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCandidate {
    pub identifier: String,
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistTrackEntry>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrackEntry {
    pub track: Option<TrackRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRef {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<SearchTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTrack {
    pub uri: String,
    pub name: String,
    pub album: SearchAlbum,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchAlbum {
    pub release_date: Option<String>,
    pub release_date_precision: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveTracksRequest {
    pub tracks: Vec<TrackRefPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackRefPayload {
    pub uri: String,
}

#[derive(Tabled)]
pub struct PlanTableRow {
    pub action: String,
    pub track: String,
}
