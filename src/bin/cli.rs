//! Proton Registry CLI
//!
//! Runs one update cycle and exits. Meant to be scheduled externally.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use proton_registry::{
    error::{AppError, Result},
    models::Config,
    pipeline::{Decision, SmartFilter, UpdateOutcome, Updater},
    services::GitHubFetcher,
    storage::{IndexSlot, IndexStorage, LocalStorage},
};

/// Proton Registry - GE-Proton release index generator
#[derive(Parser, Debug)]
#[command(
    name = "registry",
    version,
    about = "Mirrors GE-Proton releases into static JSON indexes"
)]

struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "registry.toml")]
    config: PathBuf,

    /// Override the output directory of both indexes
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Check for a new release and rewrite both indexes (default)
    Update,

    /// Report whether an update is needed without writing anything
    Check,

    /// Validate the configuration file
    Validate,

    /// Show the current local indexes
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Execution failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    log::info!("Proton Registry starting...");

    let command = cli.command.unwrap_or(Command::Update);
    let mut config = if matches!(command, Command::Validate) && cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::load_or_default(&cli.config)
    };
    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    let storage = LocalStorage::from_config(&config.output);

    match command {
        Command::Update => {
            let dir = &config.output.dir;
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                AppError::Io(std::io::Error::new(
                    e.kind(),
                    format!("cannot create output directory {}: {}", dir.display(), e),
                ))
            })?;

            let fetcher = GitHubFetcher::from_config(&config)?;
            let filter = SmartFilter::with_keep_recent(config.filter.keep_recent);
            let outcome = Updater::new(&fetcher, &storage, filter).run().await?;
            report(&outcome, &storage);
        }

        Command::Check => {
            let fetcher = GitHubFetcher::from_config(&config)?;
            let filter = SmartFilter::with_keep_recent(config.filter.keep_recent);
            match Updater::new(&fetcher, &storage, filter).check().await {
                Decision::UpToDate { version } => {
                    log::info!("Up to date at {}. Nothing to do.", version);
                }
                Decision::Refresh { reason, .. } => {
                    log::info!("Update needed: {}", reason);
                }
            }
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("  Source: {}", config.source.api_base);
            log::info!("  Output: {}", storage.root_dir().display());
        }

        Command::Info => {
            log::info!("Output directory: {}", storage.root_dir().display());
            for slot in [IndexSlot::Full, IndexSlot::Smart] {
                match storage.read_index(slot).await {
                    Ok(index) => log::info!(
                        "{} index: {} releases, newest {}",
                        slot,
                        index.len(),
                        if index.is_empty() { "-" } else { index.latest_version() }
                    ),
                    Err(e) => log::info!("{} index: not available ({})", slot, e),
                }
            }
        }
    }

    log::info!("Done!");
    Ok(())
}

fn report(outcome: &UpdateOutcome, storage: &LocalStorage) {
    match outcome {
        UpdateOutcome::UpToDate { version } => {
            log::info!("Registry already up to date at {}. Exiting.", version);
        }
        UpdateOutcome::Refreshed(summary) => {
            if summary.is_degraded() {
                log::warn!("Indexes rebuilt without a successful latest-release check.");
            }
            log::info!("Refresh reason: {}", summary.reason);
            log::info!(
                "Full index: {} releases ({})",
                summary.full_count,
                storage.slot_path(IndexSlot::Full).display()
            );
            log::info!(
                "Smart index: {} releases ({})",
                summary.smart_count,
                storage.slot_path(IndexSlot::Smart).display()
            );
            if let Some(diff) = &summary.diff {
                if !diff.added.is_empty() {
                    log::info!("New releases: {}", diff.added.join(", "));
                }
                if !diff.removed.is_empty() {
                    log::info!("Removed releases: {}", diff.removed.join(", "));
                }
            }
            log::info!("All set! Indexes updated.");
        }
    }
}
