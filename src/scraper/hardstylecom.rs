use std::collections::HashSet;

use ::scraper::Html;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::ScrapeError,
    info,
    types::{Genre, TrackRecord},
    utils::{compose_title, parse_source_date},
};

use super::{
    CutoffDecision, CutoffPolicy, PageFetcher, SiteAdapter, dedup, element_text, extract_artist,
    selector,
};

pub const BASE_URL: &str = "https://hardstyle.com";
pub const PAGE_COUNT: u32 = 4;
const DATE_FORMAT: &str = "%d.%m.%Y";
const CUTOFF: CutoffPolicy = CutoffPolicy::SkipOlder;

/// One row of a hardstyle.com track listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub detail_path: String,
    pub title: String,
    pub qualifier: Option<String>,
    pub artist: String,
}

/// Adapter for the paginated track listing of hardstyle.com.
///
/// The listing pages carry no dates, so every entry's detail page is
/// fetched for its release date. Entries older than the cutoff are skipped
/// one by one, the listing is not assumed to be sorted.
pub struct HardstyleDotCom<F> {
    fetcher: F,
    genre: Genre,
    pages: u32,
}

impl<F: PageFetcher> HardstyleDotCom<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            genre: Genre::Hardstyle,
            pages: PAGE_COUNT,
        }
    }

    pub fn with_genre(mut self, genre: Genre) -> Self {
        self.genre = genre;
        self
    }

    pub fn listing_url(&self, page: u32) -> String {
        match self.genre.query_value() {
            Some(genre) => format!("{BASE_URL}/en/tracks?page={page}&genre={genre}"),
            None => format!("{BASE_URL}/en/tracks?page={page}"),
        }
    }

    pub fn detail_url(path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{BASE_URL}{path}")
        }
    }
}

#[async_trait]
impl<F: PageFetcher> SiteAdapter for HardstyleDotCom<F> {
    fn name(&self) -> &'static str {
        "hardstyle.com"
    }

    async fn fetch_tracks(
        &self,
        from_date: NaiveDate,
    ) -> Result<HashSet<TrackRecord>, ScrapeError> {
        let mut tracks = Vec::new();

        info!("Fetching tracks from {}...", self.name());
        for page in 1..=self.pages {
            info!("Fetching tracks, page {}", page);
            let listing = self.fetcher.fetch(&self.listing_url(page)).await?;
            let entries = parse_listing(&listing)?;

            for entry in entries {
                let detail = self
                    .fetcher
                    .fetch(&Self::detail_url(&entry.detail_path))
                    .await?;
                let release_date = parse_detail_date(&detail)?;

                match CUTOFF.decide(release_date, from_date) {
                    CutoffDecision::Keep => {}
                    CutoffDecision::Skip => {
                        log::debug!("Skipping {} from {}", entry.title, release_date);
                        continue;
                    }
                    CutoffDecision::Stop => break,
                }

                let title = compose_title(&entry.title, entry.qualifier.as_deref());
                tracks.push(
                    TrackRecord::new(title, entry.artist)
                        .with_release_date(release_date)
                        .with_genre(self.genre),
                );
            }
        }

        let tracks = dedup(tracks);
        info!(
            "Fetched a total of {} entries from {}",
            tracks.len(),
            self.name()
        );
        Ok(tracks)
    }
}

/// Extracts the entries of one listing page.
///
/// Each `div.trackContent` holds up to two `a.linkTitle` links: the first
/// points at the detail page and carries the title, the optional second one
/// carries the mix qualifier.
pub fn parse_listing(html: &str) -> Result<Vec<ListingEntry>, ScrapeError> {
    let document = Html::parse_document(html);
    let entry_selector = selector("div.trackContent")?;
    let link_selector = selector("a.linkTitle")?;

    let mut entries = Vec::new();
    for (index, entry) in document.select(&entry_selector).enumerate() {
        let context = format!("hardstyle.com listing entry #{}", index + 1);
        let mut links = entry.select(&link_selector);

        let track_link = links.next().ok_or_else(|| ScrapeError::MissingField {
            field: "track link",
            context: context.clone(),
        })?;
        let detail_path = track_link
            .value()
            .attr("href")
            .ok_or_else(|| ScrapeError::MissingField {
                field: "track link href",
                context: context.clone(),
            })?
            .trim()
            .to_string();
        let title = track_link
            .value()
            .attr("title")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ScrapeError::MissingField {
                field: "track title",
                context: context.clone(),
            })?;
        let qualifier = links
            .next()
            .and_then(|link| link.value().attr("title"))
            .map(|t| t.trim().to_string());

        let artist = extract_artist(&entry, "span.artists", "a.highlight")?;

        entries.push(ListingEntry {
            detail_path,
            title,
            qualifier,
            artist,
        });
    }

    Ok(entries)
}

/// Release date shown on a track detail page (`span.date`, `dd.mm.yyyy`).
pub fn parse_detail_date(html: &str) -> Result<NaiveDate, ScrapeError> {
    let document = Html::parse_document(html);
    let date_selector = selector("span.date")?;

    let date = document
        .select(&date_selector)
        .next()
        .map(|e| element_text(&e))
        .ok_or_else(|| ScrapeError::MissingField {
            field: "release date",
            context: "hardstyle.com track detail page".to_string(),
        })?;

    parse_source_date(&date, DATE_FORMAT)
}
