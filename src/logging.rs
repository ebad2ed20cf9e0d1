//! Console and log file output.
//!
//! Every run logs to stdout and to its own timestamped file in the log
//! directory, `hardstyle_watcher_<YYYY-MM-DD_HH-MM-SS>.log`.

use std::path::{Path, PathBuf};

use chrono::Local;
use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Record};
use thiserror::Error;

/// Log target used by the `success!` macro.
pub const SUCCESS_TARGET: &str = "hardstyle_watcher::success";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot create log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("logger already installed: {0}")]
    Install(#[from] log::SetLoggerError),
}

/// Installs the global logger and returns the path of this run's log file.
pub fn init(log_dir: &Path, verbose: bool) -> Result<PathBuf, LoggingError> {
    std::fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file_name(Local::now()));

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}", bullet(record), message))
        })
        .chain(std::io::stdout());

    let file = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} - {} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(fern::log_file(&log_path)?);

    fern::Dispatch::new()
        .level(level)
        .level_for("reqwest", LevelFilter::Warn)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("html5ever", LevelFilter::Warn)
        .level_for("selectors", LevelFilter::Warn)
        .chain(console)
        .chain(file)
        .apply()?;

    Ok(log_path)
}

pub fn log_file_name<Tz: chrono::TimeZone>(started_at: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "hardstyle_watcher_{}.log",
        started_at.format("%Y-%m-%d_%H-%M-%S")
    )
}

fn bullet(record: &Record) -> ColoredString {
    match record.level() {
        Level::Error => "!".red().bold(),
        Level::Warn => "!".yellow().bold(),
        Level::Info if record.target() == SUCCESS_TARGET => "✓".green().bold(),
        Level::Info => "o".blue().bold(),
        Level::Debug | Level::Trace => "·".dimmed(),
    }
}
