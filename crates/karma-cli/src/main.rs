mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "karma",
    about = "Award karma and track threshold-based roles",
    version,
    propagate_version = true
)]
struct Cli {
    /// Karma manifest (default: nearest config/karma.yaml walking up from cwd)
    #[arg(long, global = true, env = "KARMA_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Enable debug logging
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add (or with a negative value, deduct) karma for a user
    Award {
        username: String,
        /// Points to add; negative values deduct, never below zero
        #[arg(allow_negative_numbers = true)]
        points: i64,
    },

    /// Show a user's karma and role
    Show { username: String },

    /// List users by karma, highest first
    Leaderboard {
        /// Only show the top N users
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Inspect the karma manifest
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let manifest = root::resolve_manifest(cli.config.as_deref());
    tracing::debug!(manifest = %manifest.display(), "resolved karma manifest");

    let result = match cli.command {
        Commands::Award { username, points } => {
            cmd::award::run(&manifest, &username, points, cli.json)
        }
        Commands::Show { username } => cmd::show::run(&manifest, &username, cli.json),
        Commands::Leaderboard { limit } => cmd::leaderboard::run(&manifest, limit, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&manifest, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
