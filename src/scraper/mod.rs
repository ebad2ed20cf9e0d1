//! # Site Adapters
//!
//! Every supported release listing is a [`SiteAdapter`]: it fetches a bounded
//! window of recent tracks from its source and returns them deduplicated.
//! Adapters do not talk HTTP themselves, they get a [`PageFetcher`] injected;
//! [`HttpFetcher`] is the production one and wraps every request in the
//! retry policy.
//!
//! HTML is parsed in synchronous helpers that return plain data, so a parsed
//! document never lives across an `.await`.

pub mod hardstylecom;
pub mod releasehardstyle;

use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use ::scraper::{ElementRef, Selector};
use tokio::time::sleep;

pub use hardstylecom::HardstyleDotCom;
pub use releasehardstyle::ReleaseHardstyle;

use crate::{
    error::{FetchError, ScrapeError},
    types::TrackRecord,
    utils::{RetryPolicy, with_retry},
};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0";

/// Fetches the recent tracks of one source.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Human readable name of the source, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Tracks released on or after `from_date`, one per title/artist pair.
    async fn fetch_tracks(&self, from_date: NaiveDate) -> Result<HashSet<TrackRecord>, ScrapeError>;
}

/// Retrieves the body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Supported release listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Source {
    #[default]
    ReleaseHardstyle,
    HardstyleCom,
}

/// What an adapter does with an entry dated before the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffPolicy {
    /// Drop the entry and carry on with the next one.
    SkipOlder,
    /// Drop the entry and every entry after it; for listings sorted newest first.
    StopAtOlder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoffDecision {
    Keep,
    Skip,
    Stop,
}

impl CutoffPolicy {
    pub fn decide(&self, release_date: NaiveDate, from_date: NaiveDate) -> CutoffDecision {
        if release_date >= from_date {
            return CutoffDecision::Keep;
        }
        match self {
            CutoffPolicy::SkipOlder => CutoffDecision::Skip,
            CutoffPolicy::StopAtOlder => CutoffDecision::Stop,
        }
    }
}

/// [`PageFetcher`] over HTTP with retries and a politeness delay.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
    pace: Duration,
}

impl HttpFetcher {
    pub fn new(policy: RetryPolicy, pace: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            policy,
            pace,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if !self.pace.is_zero() {
            sleep(self.pace).await;
        }

        let client = &self.client;
        with_retry(&self.policy, url, || async move {
            let response = client.get(url).send().await?.error_for_status()?;
            response.text().await
        })
        .await
        .map_err(|e| FetchError {
            url: url.to_string(),
            source: Box::new(e),
        })
    }
}

/// Collapses records with the same title and artist, first one wins.
pub fn dedup(tracks: impl IntoIterator<Item = TrackRecord>) -> HashSet<TrackRecord> {
    let mut set = HashSet::new();
    for track in tracks {
        set.insert(track);
    }
    set
}

pub(crate) fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector(format!("{css}: {e}")))
}

/// Text content of an element with surrounding whitespace removed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Artist of a listing entry.
///
/// Prefers the `title` attribute of the highlighted link inside the artist
/// container, otherwise uses the container text.
pub(crate) fn extract_artist(
    entry: &ElementRef,
    container_css: &str,
    highlight_css: &str,
) -> Result<String, ScrapeError> {
    let container_selector = selector(container_css)?;
    let highlight_selector = selector(highlight_css)?;

    let container = entry
        .select(&container_selector)
        .next()
        .ok_or(ScrapeError::MissingField {
            field: "artist container",
            context: container_css.to_string(),
        })?;

    let highlighted = container
        .select(&highlight_selector)
        .next()
        .and_then(|a| a.value().attr("title"))
        .map(|t| t.trim().to_string());

    Ok(highlighted.unwrap_or_else(|| element_text(&container)))
}
