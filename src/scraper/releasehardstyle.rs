use std::collections::HashSet;

use ::scraper::Html;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    error::ScrapeError,
    info,
    types::{Genre, PlaylistItem, TrackRecord},
    utils::parse_source_date,
};

use super::{CutoffDecision, CutoffPolicy, PageFetcher, SiteAdapter, dedup, selector};

pub const INDEX_URL: &str = "https://releasehardstyle.nl/releases/";
pub const DETAIL_URL: &str = "https://releasehardstyle.nl/release";
const DATE_FORMAT: &str = "%d %b %Y";
const CUTOFF: CutoffPolicy = CutoffPolicy::StopAtOlder;

/// One release listed on the releasehardstyle.nl index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub target_id: String,
    /// Track URI from the entry's Spotify link, `None` when the link is
    /// missing or does not point at a track.
    pub external_id: Option<String>,
}

/// Title and release date from a release detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDetail {
    pub title: String,
    pub release_date: NaiveDate,
}

/// Adapter for the release index of releasehardstyle.nl.
///
/// The index lists releases newest first and links most of them to Spotify,
/// so those records come with their identifier already resolved; the rest
/// go through search. The first release
/// older than the cutoff ends the scan.
pub struct ReleaseHardstyle<F> {
    fetcher: F,
}

impl<F: PageFetcher> ReleaseHardstyle<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn detail_url(target_id: &str) -> String {
        format!("{DETAIL_URL}/{target_id}/")
    }
}

#[async_trait]
impl<F: PageFetcher> SiteAdapter for ReleaseHardstyle<F> {
    fn name(&self) -> &'static str {
        "releasehardstyle.nl"
    }

    async fn fetch_tracks(
        &self,
        from_date: NaiveDate,
    ) -> Result<HashSet<TrackRecord>, ScrapeError> {
        let mut tracks = Vec::new();

        info!("Fetching tracks from {}...", self.name());
        let index = self.fetcher.fetch(INDEX_URL).await?;
        let entries = parse_index(&index)?;
        log::debug!("Found {} releases on the index", entries.len());

        for entry in entries {
            let detail = self
                .fetcher
                .fetch(&Self::detail_url(&entry.target_id))
                .await?;
            let detail = parse_detail(&detail)?;

            match CUTOFF.decide(detail.release_date, from_date) {
                CutoffDecision::Keep => {}
                CutoffDecision::Skip => continue,
                CutoffDecision::Stop => {
                    log::debug!(
                        "Reached {} from {}, older than {}",
                        detail.title,
                        detail.release_date,
                        from_date
                    );
                    break;
                }
            }

            info!("Retrieved track: {}, {}", detail.title, detail.release_date);
            let mut track = TrackRecord::new(detail.title, "")
                .with_release_date(detail.release_date)
                .with_genre(Genre::Hardstyle);
            track.external_id = entry.external_id;
            tracks.push(track);
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

/// Extracts the releases of the index page.
///
/// The page has several `div.releasetracker-list-container` blocks; the
/// release list is the second one.
pub fn parse_index(html: &str) -> Result<Vec<IndexEntry>, ScrapeError> {
    let document = Html::parse_document(html);
    let container_selector = selector("div.releasetracker-list-container")?;
    let entry_selector = selector("div.releasetracker-list-entry")?;
    let link_selector = selector("#releasetracker-a")?;

    let container = document
        .select(&container_selector)
        .nth(1)
        .ok_or_else(|| ScrapeError::MissingField {
            field: "release list",
            context: "releasehardstyle.nl index".to_string(),
        })?;

    let mut entries = Vec::new();
    for (index, entry) in container.select(&entry_selector).enumerate() {
        let context = format!("releasehardstyle.nl index entry #{}", index + 1);

        let target_id = entry
            .value()
            .attr("targetid")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ScrapeError::MissingField {
                field: "targetid",
                context: context.clone(),
            })?;

        let href = entry
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"));
        let external_id = href
            .and_then(PlaylistItem::from_spotify_ref)
            .map(|item| item.id().to_string());
        if external_id.is_none() {
            log::debug!("No usable Spotify link for {}: {:?}", context, href);
        }

        entries.push(IndexEntry {
            target_id,
            external_id,
        });
    }

    Ok(entries)
}

/// Extracts title and release date from a release detail page.
///
/// The info block is a list of `Label: value` lines. The value may sit in
/// its own text node, in which case it is the next non-empty line.
pub fn parse_detail(html: &str) -> Result<ReleaseDetail, ScrapeError> {
    let document = Html::parse_document(html);
    let info_selector = selector("div.releasetracker_details-info_container-inner")?;

    let info = document
        .select(&info_selector)
        .next()
        .ok_or_else(|| ScrapeError::MissingField {
            field: "release info",
            context: "releasehardstyle.nl release page".to_string(),
        })?;

    let text = info.text().collect::<Vec<_>>().join("\n");
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = labelled_value(&lines, "Title:").ok_or_else(|| ScrapeError::MissingField {
        field: "title",
        context: "releasehardstyle.nl release page".to_string(),
    })?;
    let release_date =
        labelled_value(&lines, "Release date:").ok_or_else(|| ScrapeError::MissingField {
            field: "release date",
            context: "releasehardstyle.nl release page".to_string(),
        })?;

    Ok(ReleaseDetail {
        title,
        release_date: parse_source_date(&release_date, DATE_FORMAT)?,
    })
}

fn labelled_value(lines: &[&str], label: &str) -> Option<String> {
    let position = lines.iter().position(|line| line.contains(label))?;
    let inline = lines[position].replace(label, "").trim().to_string();
    if !inline.is_empty() {
        return Some(inline);
    }
    lines
        .get(position + 1)
        .filter(|next| !next.ends_with(':'))
        .map(|next| next.to_string())
}
