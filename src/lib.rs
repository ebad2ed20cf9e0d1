//! Hardstyle Watcher Library
//!
//! This library scrapes hardstyle and hardcore release listing sites, resolves the
//! discovered tracks to Spotify track identifiers and reconciles a target playlist
//! so that it contains exactly the freshly discovered set.
//!
//! # Modules
//!
//! - `cli` - Wiring of one end-to-end run for the binary
//! - `config` - Configuration management and environment variables
//! - `error` - Error types for every failure class of a run
//! - `logging` - Console and log file output
//! - `management` - Shared credential state with refresh and caching
//! - `scraper` - Site adapters for the supported release listings
//! - `service` - The playlist service port used by the sync core
//! - `spotify` - Spotify Web API implementation of the playlist service
//! - `sync` - Resolution, reconciliation and the run orchestrator
//! - `types` - Data structures and type definitions
//! - `utils` - Retry policy, title composition and date helpers
//!
//! # Example
//!
//! ```
//! use hardstyle_watcher::{cli, config};
//!
//! #[tokio::main]
//! async fn main() -> hardstyle_watcher::Res<()> {
//!     config::load_env().await?;
//!     cli::sync(cli::SyncArgs::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod scraper;
pub mod service;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the binary boundary where the concrete error no longer matters,
/// only its message. Library modules return their own error enums from
/// [`error`].
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Logs an informational message.
///
/// Rendered on the console with a blue bullet point and written to the
/// run's log file.
///
/// # Example
///
/// ```
/// info!("Fetching tracks, page {}", page);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    ::log::info!($($arg)*);
  })
}

/// Logs a success message.
///
/// Uses the [`logging::SUCCESS_TARGET`] target so the console renders it
/// with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Playlist synchronized");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    ::log::info!(target: $crate::logging::SUCCESS_TARGET, $($arg)*);
  })
}

/// Logs a warning message.
///
/// Used for recoverable issues, such as a track that could not be resolved,
/// that must not abort the run.
///
/// # Example
///
/// ```
/// warning!("Track not found: {}", track);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    ::log::warn!($($arg)*);
  })
}
