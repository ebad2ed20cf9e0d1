//! # Sync Core
//!
//! One run goes through four steps:
//!
//! ```text
//! playlist service ── current contents ─────────────────────┐
//!                                                           ↓
//! site adapter ── track records ── resolver ── items ── reconcile ── apply
//! ```
//!
//! A failure to read the playlist, to scrape the source or to apply the plan
//! ends the run. A track that cannot be resolved is reported and dropped,
//! the rest of the batch goes on.

mod reconcile;
mod resolver;

use std::collections::HashSet;

use chrono::NaiveDate;
use indicatif::ProgressBar;

pub use reconcile::{ReconcilePlan, apply, reconcile};
pub use resolver::{DEFAULT_SEARCH_LIMIT, Resolution, TrackResolver};

use crate::{
    config::DEFAULT_MARKET,
    error::SyncError,
    info,
    scraper::SiteAdapter,
    service::PlaylistService,
    types::{PlaylistItem, TrackRecord},
    warning,
};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Scrape cutoff: source entries released before this date are ignored.
    pub from_date: NaiveDate,
    /// Search results released before this date are rejected.
    pub match_from_date: NaiveDate,
    pub market: String,
    pub search_limit: u32,
    /// Compute the plan without touching the playlist.
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn new(from_date: NaiveDate, match_from_date: NaiveDate) -> Self {
        Self {
            from_date,
            match_from_date,
            market: DEFAULT_MARKET.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            dry_run: false,
        }
    }
}

/// Why a scraped track did not make it into the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    NoMatch,
    Stale { identifier: String, release_date: NaiveDate },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Unresolved {
    pub track: TrackRecord,
    pub reason: UnresolvedReason,
}

#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub scraped: usize,
    pub resolved: usize,
    pub unresolved: Vec<Unresolved>,
    pub plan: ReconcilePlan,
    pub applied: bool,
}

/// Runs one full sync of `adapter`'s tracks into the playlist behind `service`.
pub async fn run(
    adapter: &dyn SiteAdapter,
    service: &dyn PlaylistService,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    info!("Starting sync");

    let current = service.get_playlist().await.map_err(SyncError::Playlist)?;
    info!("Playlist holds {} tracks", current.len());

    let tracks = adapter
        .fetch_tracks(options.from_date)
        .await
        .map_err(|error| SyncError::Scrape {
            source_name: adapter.name(),
            error,
        })?;

    let (resolved, unresolved) = resolve_all(service, &tracks, options).await;

    let plan = reconcile(&current, &resolved);
    let mut report = SyncReport {
        scraped: tracks.len(),
        resolved: resolved.len(),
        unresolved,
        plan,
        applied: false,
    };

    if options.dry_run {
        info!("Dry run, leaving the playlist untouched");
        return Ok(report);
    }

    apply(service, &report.plan).await?;
    report.applied = true;

    Ok(report)
}

async fn resolve_all(
    service: &dyn PlaylistService,
    tracks: &HashSet<TrackRecord>,
    options: &SyncOptions,
) -> (HashSet<PlaylistItem>, Vec<Unresolved>) {
    let resolver = TrackResolver::new(service, options.market.clone(), options.search_limit);
    let mut resolved = HashSet::new();
    let mut unresolved = Vec::new();

    // Stable order keeps logs of consecutive runs comparable.
    let mut ordered: Vec<&TrackRecord> = tracks.iter().collect();
    ordered.sort_by(|a, b| (&a.artist_name, &a.title).cmp(&(&b.artist_name, &b.title)));

    let pb = ProgressBar::new_spinner();
    pb.set_message("Resolving tracks...");

    for track in ordered {
        pb.tick();
        let reason = match resolver.resolve(track, options.match_from_date).await {
            Ok(Resolution::Trusted(item)) | Ok(Resolution::Matched(item)) => {
                resolved.insert(item);
                continue;
            }
            Ok(Resolution::NoMatch) => {
                warning!("Track not found: {}", track);
                UnresolvedReason::NoMatch
            }
            Ok(Resolution::Stale {
                identifier,
                release_date,
            }) => {
                warning!(
                    "Only found a stale match for {}: {} from {}",
                    track,
                    identifier,
                    release_date
                );
                UnresolvedReason::Stale {
                    identifier,
                    release_date,
                }
            }
            Err(e) => {
                warning!("Failed to gather track uri for {}: {}", track, e);
                UnresolvedReason::Failed(e.to_string())
            }
        };

        unresolved.push(Unresolved {
            track: track.clone(),
            reason,
        });
    }

    pb.finish_and_clear();
    (resolved, unresolved)
}
