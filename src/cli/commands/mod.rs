//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `download`: playlist download and track listing
//! - `daemon`: daemon status and single-track search

mod daemon;
mod download;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::runtime::Runtime;

use crate::config::{self, Config};
use crate::error::Result;
use crate::playlist::{CommandSource, FileSource, PlaylistSource, SpotifyClient};
use crate::resolve::normalize_base_url;
use crate::slskd::{DaemonCredentials, SlskdClient};

pub use daemon::{cmd_search, cmd_status};
pub use download::{cmd_download, cmd_tracks};

/// Resolve playlists against a Soulseek daemon
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where a track list comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Spotify playlist URL, URI or id
    Spotify,
    /// Local JSON or "Artist - Title" text file
    File,
    /// External scraper printing JSON albums
    Command,
}

/// Options shared by commands that read a playlist
#[derive(Debug, Clone, clap::Args)]
pub struct SourceArgs {
    /// Playlist source
    #[arg(short, long, value_enum, default_value = "spotify")]
    pub source: SourceKind,

    /// Scraper program for `--source command`
    #[arg(long, required_if_eq("source", "command"))]
    pub command: Option<PathBuf>,

    /// Extra arguments passed to the scraper before the reference
    #[arg(long = "command-arg", allow_hyphen_values = true)]
    pub command_args: Vec<String>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every track of a playlist and queue the downloads
    Download {
        /// Playlist URL, URI, id, file path or scraper argument
        reference: String,
        #[command(flatten)]
        source: SourceArgs,
        /// Tracks processed at once (overrides MAX_CONCURRENT_DOWNLOADS)
        #[arg(short = 'j', long)]
        concurrency: Option<usize>,
    },
    /// List the tracks a playlist source yields
    Tracks {
        reference: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Search one track and show the pick without downloading
    Search { artist: String, title: String },
    /// Connect to the daemon and show its state
    Status,
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    let rt = Runtime::new()?;
    let config = load_config(cli).context("loading configuration")?;

    match &cli.command {
        Commands::Download {
            reference,
            source,
            concurrency,
        } => cmd_download(&rt, config, source, reference, *concurrency),
        Commands::Tracks { reference, source } => cmd_tracks(&rt, &config, source, reference),
        Commands::Search { artist, title } => cmd_search(&rt, &config, artist, title),
        Commands::Status => cmd_status(&rt, &config),
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config {
        Some(ref path) => {
            // A missing .env file is normal
            let _ = dotenvy::dotenv();
            let mut config = config::load_from(path)?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => config::load()?,
    };
    Ok(config)
}

/// Build the daemon client. Call only after [`Config::validate`].
pub(crate) fn daemon_client(config: &Config) -> anyhow::Result<SlskdClient> {
    let daemon = &config.daemon;
    let base_url = normalize_base_url(&daemon.host, daemon.port)?;
    let credentials = DaemonCredentials {
        username: daemon.username.clone(),
        password: daemon.password.clone(),
        api_key: daemon.api_key.clone(),
    };
    Ok(SlskdClient::new(
        base_url,
        credentials,
        Duration::from_secs(daemon.probe_timeout_secs),
        Duration::from_secs(daemon.request_timeout_secs),
    )?)
}

pub(crate) fn playlist_source(config: &Config, args: &SourceArgs) -> anyhow::Result<Box<dyn PlaylistSource>> {
    let source: Box<dyn PlaylistSource> = match args.source {
        SourceKind::Spotify => {
            let credentials = config
                .catalog
                .credentials()
                .map(|(id, secret)| (id.to_string(), secret.to_string()));
            Box::new(SpotifyClient::new(credentials)?)
        }
        SourceKind::File => Box::new(FileSource::new()),
        SourceKind::Command => {
            let Some(ref program) = args.command else {
                anyhow::bail!("--source command needs --command <PATH>");
            };
            Box::new(CommandSource::new(program, args.command_args.clone()))
        }
    };
    Ok(source)
}
