//! # CLI Module
//!
//! The command-line layer of the hardstyle watcher. It turns the parsed
//! arguments and the environment into concrete collaborators for one run
//! and presents the outcome to the user.
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (arguments, summary output)
//!     ↓
//! Sync Core (resolve, reconcile, apply)
//!     ↓
//! Site Adapters / Spotify Integration
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Usage Patterns
//!
//! ```bash
//! hardstyle-watcher                                  # one sync with the defaults
//! hardstyle-watcher --source hardstyle-com --days 7  # weekly window from hardstyle.com
//! hardstyle-watcher --dry-run                        # show the plan, change nothing
//! ```

mod sync;

pub use sync::SyncArgs;
pub use sync::sync;
pub use sync::sync_with_config;
