//! romdeck CLI
//!
//! Keeps a handheld's game library in step with a library server: cached
//! listings, cover art, ROM downloads and two-way save sync.

mod commands;
mod error;
mod session;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use romdeck_lib::{Config, settings};

use crate::commands::cache::CacheTarget;
use crate::error::CliError;
use crate::session::Session;

#[derive(Parser)]
#[command(name = "romdeck")]
#[command(about = "Sync a handheld game library with a library server", long_about = None)]
struct Cli {
    /// Config file (defaults to $ROMDECK_CONFIG, then ./config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the server's platforms
    Platforms,

    /// Validate cached listings against the server and refetch stale ones
    Refresh,

    /// List a platform's games
    Roms {
        /// Platform slug (e.g., gba, snes)
        slug: String,

        /// Download games missing from the card
        #[arg(short, long)]
        download: bool,
    },

    /// Download cover art for a platform
    Art {
        /// Platform slug
        slug: String,

        /// Also replace covers the server has updated
        #[arg(long)]
        check: bool,
    },

    /// Sync save files with the server
    Saves {
        /// Show the plan without changing anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Manage cached data
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached listings
    List,

    /// Remove cached data
    Clear {
        #[arg(value_enum, default_value = "all")]
        target: CacheTarget,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,
}

/// `RUST_LOG` wins; otherwise the config's `log_level`. Info lines are
/// printed bare since they are the command's output.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level.to_lowercase());
    env_logger::Builder::from_env(env)
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "[{level}] {}", record.args()),
        })
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config_path = settings::resolve_config_path(cli.config);

    let config = match Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "{} {}: {e}",
                "\u{2718}".if_supports_color(Stderr, |t| t.red()),
                config_path.display(),
            );
            std::process::exit(1);
        }
    };
    init_logging(&config.log_level);

    if let Err(e) = run(cli.command, config, config_path) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands, config: Config, config_path: PathBuf) -> Result<(), CliError> {
    // Commands that never touch the server
    match &command {
        Commands::Cache { action } => {
            return match action {
                CacheAction::List => {
                    commands::cache::run_cache_list(&config);
                    Ok(())
                }
                CacheAction::Clear { target } => commands::cache::run_cache_clear(&config, *target),
            };
        }
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show => commands::config::run_config_show(&config, &config_path),
                ConfigAction::Path => {
                    commands::config::run_config_path(&config_path);
                    Ok(())
                }
            };
        }
        _ => {}
    }

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("failed to create tokio runtime: {e}")))?;

    rt.block_on(async {
        let session = Session::open(config, &config_path).await?;
        match command {
            Commands::Platforms => commands::platforms::run_platforms(&session).await,
            Commands::Refresh => commands::refresh::run_refresh(&session).await,
            Commands::Roms { slug, download } => {
                commands::roms::run_roms(&session, &slug, download).await
            }
            Commands::Art { slug, check } => commands::art::run_art(&session, &slug, check).await,
            Commands::Saves { dry_run } => commands::saves::run_saves(&session, dry_run).await,
            Commands::Cache { .. } | Commands::Config { .. } => Ok(()),
        }
    })
}
