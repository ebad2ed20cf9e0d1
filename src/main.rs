use std::{path::PathBuf, process::ExitCode};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use hardstyle_watcher::{cli, config, logging, scraper::Source, types::Genre};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Release listing to scrape
    #[clap(long, value_enum, default_value_t = Source::ReleaseHardstyle)]
    source: Source,

    /// Only take releases from the last N days
    #[clap(long, default_value_t = 2)]
    days: u32,

    /// Reject search matches released more than N days ago
    #[clap(long, default_value_t = 7)]
    match_days: u32,

    /// Genre filter for sources that support one
    #[clap(long, value_enum, default_value_t = Genre::Hardstyle)]
    genre: Genre,

    /// Show the planned changes without applying them
    #[clap(long)]
    dry_run: bool,

    /// Log debug output
    #[clap(long, short)]
    verbose: bool,

    /// Directory for the run's log file
    #[clap(long)]
    log_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Command::Completions(opt)) = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    let env_result = config::load_env().await;

    let log_dir = cli.log_dir.clone().unwrap_or_else(config::log_dir);
    match logging::init(&log_dir, cli.verbose) {
        Ok(path) => log::debug!("Logging to {}", path.display()),
        Err(e) => eprintln!("Cannot set up logging: {}", e),
    }

    if let Err(e) = env_result {
        log::error!("Cannot load environment. Err: {}", e);
        return ExitCode::FAILURE;
    }

    let args = cli::SyncArgs {
        source: cli.source,
        days: cli.days,
        match_days: cli.match_days,
        genre: cli.genre,
        dry_run: cli.dry_run,
    };

    match cli::sync(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Sync failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
