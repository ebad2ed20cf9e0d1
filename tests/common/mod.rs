#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::NaiveDate;

use hardstyle_watcher::{
    error::{FetchError, ServiceError},
    scraper::PageFetcher,
    service::PlaylistService,
    types::{PlaylistItem, SearchCandidate, TrackQuery},
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn items(ids: &[&str]) -> HashSet<PlaylistItem> {
    ids.iter().map(|id| PlaylistItem::new(*id)).collect()
}

pub fn candidate(uri: &str, release_date: Option<&str>) -> SearchCandidate {
    SearchCandidate {
        identifier: uri.to_string(),
        release_date: release_date.map(str::to_string),
    }
}

/// Serves pages from memory and remembers every requested URL.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    fallback: Option<String>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// Body served for URLs without an explicit page.
    pub fn fallback(mut self, html: impl Into<String>) -> Self {
        self.fallback = Some(html.into());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| FetchError {
                url: url.to_string(),
                source: "404 Not Found".into(),
            })
    }
}

#[async_trait]
impl<'a> PageFetcher for &'a FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub playlist: HashSet<PlaylistItem>,
    /// Search results keyed by track title.
    pub results: HashMap<String, Vec<SearchCandidate>>,
    /// Number of upcoming searches answered with 401.
    pub unauthorized_searches: u32,
    pub fail_get: bool,
    pub fail_add: bool,
    pub fail_remove: bool,
    pub fail_refresh: bool,
    pub searches: Vec<TrackQuery>,
    pub refreshes: u32,
    pub add_calls: Vec<HashSet<PlaylistItem>>,
    pub remove_calls: Vec<HashSet<PlaylistItem>>,
}

/// In-memory playlist service.
#[derive(Debug, Default)]
pub struct FakePlaylistService {
    pub state: Mutex<FakeState>,
}

impl FakePlaylistService {
    pub fn with_playlist(ids: &[&str]) -> Self {
        let service = Self::default();
        service.state.lock().unwrap().playlist = items(ids);
        service
    }

    pub fn result(self, title: &str, candidates: Vec<SearchCandidate>) -> Self {
        self.state
            .lock()
            .unwrap()
            .results
            .insert(title.to_string(), candidates);
        self
    }

    pub fn playlist(&self) -> HashSet<PlaylistItem> {
        self.state.lock().unwrap().playlist.clone()
    }
}

fn rejected() -> ServiceError {
    ServiceError::Status {
        status: 500,
        body: "rejected".to_string(),
    }
}

#[async_trait]
impl PlaylistService for FakePlaylistService {
    async fn get_playlist(&self) -> Result<HashSet<PlaylistItem>, ServiceError> {
        let state = self.state.lock().unwrap();
        if state.fail_get {
            return Err(rejected());
        }
        Ok(state.playlist.clone())
    }

    async fn search_track(
        &self,
        query: &TrackQuery,
        _market: &str,
        limit: u32,
    ) -> Result<Vec<SearchCandidate>, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.searches.push(query.clone());
        if state.unauthorized_searches > 0 {
            state.unauthorized_searches -= 1;
            return Err(ServiceError::Unauthorized);
        }
        let mut found = state.results.get(&query.title).cloned().unwrap_or_default();
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn add_items(&self, items: &HashSet<PlaylistItem>) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.add_calls.push(items.clone());
        if state.fail_add {
            return Err(rejected());
        }
        state.playlist.extend(items.iter().cloned());
        Ok(())
    }

    async fn remove_items(&self, items: &HashSet<PlaylistItem>) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.remove_calls.push(items.clone());
        if state.fail_remove {
            return Err(rejected());
        }
        state.playlist.retain(|item| !items.contains(item));
        Ok(())
    }

    async fn refresh_credentials(&self) -> Result<(), ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.refreshes += 1;
        if state.fail_refresh {
            return Err(ServiceError::Credentials("refresh token revoked".to_string()));
        }
        Ok(())
    }
}
