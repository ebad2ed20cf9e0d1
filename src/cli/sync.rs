use std::time::Duration;

use chrono::{Local, NaiveDate};
use tabled::Table;

use crate::{
    Res,
    config::Config,
    error::ConfigError,
    info,
    management::TokenManager,
    scraper::{HardstyleDotCom, HttpFetcher, ReleaseHardstyle, SiteAdapter, Source},
    spotify::SpotifyClient,
    success,
    sync::{self, SyncOptions, SyncReport, UnresolvedReason},
    types::Genre,
    utils::{RetryPolicy, window_start},
    warning,
};

/// Delay before every page request, to stay polite towards the sources.
const REQUEST_PACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct SyncArgs {
    pub source: Source,
    /// Scrape window in days.
    pub days: u32,
    /// Search results released longer ago than this many days are rejected.
    pub match_days: u32,
    pub genre: Genre,
    pub dry_run: bool,
}

impl SyncArgs {
    /// Sync options for a run on `today`.
    ///
    /// A window of N days keeps releases from the last N - 1 days plus
    /// today, matching a cutoff of `now - N days` against midnight dates.
    pub fn options(&self, today: NaiveDate) -> Result<SyncOptions, ConfigError> {
        let from_date = window_start(today, self.days).ok_or_else(|| ConfigError::Invalid {
            name: "--days",
            reason: format!("{} days before {} is out of range", self.days, today),
        })?;
        let match_from_date =
            window_start(today, self.match_days).ok_or_else(|| ConfigError::Invalid {
                name: "--match-days",
                reason: format!("{} days before {} is out of range", self.match_days, today),
            })?;

        let mut options = SyncOptions::new(from_date, match_from_date);
        options.dry_run = self.dry_run;
        Ok(options)
    }
}

impl Default for SyncArgs {
    fn default() -> Self {
        Self {
            source: Source::ReleaseHardstyle,
            days: 2,
            match_days: 7,
            genre: Genre::Hardstyle,
            dry_run: false,
        }
    }
}

/// Runs one full sync configured from the environment.
pub async fn sync(args: SyncArgs) -> Res<SyncReport> {
    let config = Config::from_env()?;
    sync_with_config(&config, args).await
}

pub async fn sync_with_config(config: &Config, args: SyncArgs) -> Res<SyncReport> {
    let mut options = args.options(Local::now().date_naive())?;
    options.market = config.market.clone();

    let tokens = TokenManager::load(config).await?;
    let spotify = SpotifyClient::from_config(config, tokens);

    let fetcher = HttpFetcher::new(RetryPolicy::default(), REQUEST_PACE)?;
    let adapter: Box<dyn SiteAdapter> = match args.source {
        Source::ReleaseHardstyle => Box::new(ReleaseHardstyle::new(fetcher)),
        Source::HardstyleCom => Box::new(HardstyleDotCom::new(fetcher).with_genre(args.genre)),
    };

    info!(
        "Syncing {} releases since {} into playlist {}",
        adapter.name(),
        options.from_date,
        config.playlist_id
    );

    let report = sync::run(adapter.as_ref(), &spotify, &options).await?;
    print_summary(&report);

    Ok(report)
}

fn print_summary(report: &SyncReport) {
    if !report.plan.is_empty() {
        println!("{}", Table::new(report.plan.table_rows()));
    }

    for unresolved in &report.unresolved {
        match &unresolved.reason {
            UnresolvedReason::NoMatch => warning!("Not found: {}", unresolved.track),
            UnresolvedReason::Stale {
                identifier,
                release_date,
            } => warning!(
                "Stale match: {} ({} from {})",
                unresolved.track,
                identifier,
                release_date
            ),
            UnresolvedReason::Failed(reason) => {
                warning!("Failed: {} ({})", unresolved.track, reason)
            }
        }
    }

    let summary = format!(
        "{} scraped, {} resolved, {} unresolved; {} removed, {} added",
        report.scraped,
        report.resolved,
        report.unresolved.len(),
        report.plan.to_remove.len(),
        report.plan.to_add.len()
    );
    if report.applied {
        success!("Playlist synchronized: {}", summary);
    } else {
        info!("Planned changes: {}", summary);
    }
}
