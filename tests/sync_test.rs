mod common;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::{FakePlaylistService, candidate, date, items};
use hardstyle_watcher::error::{ScrapeError, SyncError};
use hardstyle_watcher::scraper::SiteAdapter;
use hardstyle_watcher::sync::{self, SyncOptions, UnresolvedReason};
use hardstyle_watcher::types::TrackRecord;

// Adapter that returns a fixed batch, or a parse error
struct FixedAdapter {
    tracks: Option<Vec<TrackRecord>>,
}

#[async_trait]
impl SiteAdapter for FixedAdapter {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn fetch_tracks(
        &self,
        _from_date: NaiveDate,
    ) -> Result<HashSet<TrackRecord>, ScrapeError> {
        match &self.tracks {
            Some(tracks) => Ok(tracks.iter().cloned().collect()),
            None => Err(ScrapeError::MissingField {
                field: "release list",
                context: "fixed".to_string(),
            }),
        }
    }
}

fn options() -> SyncOptions {
    SyncOptions::new(date(2024, 6, 13), date(2024, 6, 8))
}

fn batch() -> FixedAdapter {
    FixedAdapter {
        tracks: Some(vec![
            TrackRecord::new("Linked", "").with_external_id("spotify:track:linked"),
            TrackRecord::new("Energy", "Sub Zero Project"),
            TrackRecord::new("Classic", "Headhunterz"),
            TrackRecord::new("Missing", "Nobody"),
        ]),
    }
}

fn service() -> FakePlaylistService {
    FakePlaylistService::with_playlist(&["spotify:track:energy", "spotify:track:gone"])
        .result("Energy", vec![candidate("spotify:track:energy", Some("2024-06-14"))])
        .result("Classic", vec![candidate("spotify:track:classic", Some("2008-04-01"))])
}

#[tokio::test]
async fn test_run_synchronizes_playlist() {
    let service = service();

    let report = sync::run(&batch(), &service, &options()).await.unwrap();

    assert_eq!(report.scraped, 4);
    assert_eq!(report.resolved, 2);
    assert!(report.applied);
    assert_eq!(report.plan.to_remove, items(&["spotify:track:gone"]));
    assert_eq!(report.plan.to_add, items(&["spotify:track:linked"]));
    assert_eq!(
        service.playlist(),
        items(&["spotify:track:energy", "spotify:track:linked"])
    );

    // The stale and missing tracks are reported, not fatal
    assert_eq!(report.unresolved.len(), 2);
    let classic = report
        .unresolved
        .iter()
        .find(|u| u.track.title == "Classic")
        .unwrap();
    assert_eq!(
        classic.reason,
        UnresolvedReason::Stale {
            identifier: "spotify:track:classic".to_string(),
            release_date: date(2008, 4, 1),
        }
    );
    let missing = report
        .unresolved
        .iter()
        .find(|u| u.track.title == "Missing")
        .unwrap();
    assert_eq!(missing.reason, UnresolvedReason::NoMatch);
}

#[tokio::test]
async fn test_second_run_changes_nothing() {
    let service = service();

    sync::run(&batch(), &service, &options()).await.unwrap();
    let report = sync::run(&batch(), &service, &options()).await.unwrap();

    assert!(report.plan.is_empty());
    let state = service.state.lock().unwrap();
    assert_eq!(state.add_calls.len(), 1);
    assert_eq!(state.remove_calls.len(), 1);
}

#[tokio::test]
async fn test_dry_run_leaves_playlist_untouched() {
    let service = service();
    let before = service.playlist();
    let mut options = options();
    options.dry_run = true;

    let report = sync::run(&batch(), &service, &options).await.unwrap();

    assert!(!report.applied);
    assert!(!report.plan.is_empty());
    assert_eq!(service.playlist(), before);
}

#[tokio::test]
async fn test_scrape_failure_aborts_without_mutation() {
    let service = service();
    let before = service.playlist();

    let err = sync::run(&FixedAdapter { tracks: None }, &service, &options())
        .await
        .unwrap_err();

    match err {
        SyncError::Scrape { source_name, .. } => assert_eq!(source_name, "fixed"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(service.playlist(), before);
    assert!(service.state.lock().unwrap().searches.is_empty());
}

#[tokio::test]
async fn test_playlist_read_failure_aborts() {
    let service = service();
    service.state.lock().unwrap().fail_get = true;

    let err = sync::run(&batch(), &service, &options()).await.unwrap_err();

    assert!(matches!(err, SyncError::Playlist(_)));
}

#[tokio::test]
async fn test_failed_resolution_drops_only_that_track() {
    let service = service();
    {
        let mut state = service.state.lock().unwrap();
        // Every search is rejected, refreshing does not help
        state.unauthorized_searches = u32::MAX;
    }

    let report = sync::run(&batch(), &service, &options()).await.unwrap();

    // Only the linked track survives
    assert_eq!(report.resolved, 1);
    assert!(
        report
            .unresolved
            .iter()
            .all(|u| matches!(u.reason, UnresolvedReason::Failed(_)))
    );
    assert_eq!(service.playlist(), items(&["spotify:track:linked"]));
}

#[tokio::test]
async fn test_apply_failure_is_reported() {
    let service = service();
    service.state.lock().unwrap().fail_add = true;

    let err = sync::run(&batch(), &service, &options()).await.unwrap_err();

    assert!(matches!(err, SyncError::Reconcile(_)));
}
