//! slsk-playlist - resolve playlists into Soulseek downloads via slskd.
//!
//! Tracks come from a playlist source (Spotify, a local file or a scraper
//! command), are searched on the daemon, ranked, and queued for download.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod playlist;
pub mod resolve;
pub mod slskd;
#[cfg(test)]
pub mod test_utils;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Initialize logging; RUST_LOG still wins for other targets
    let level = if args.verbose { "slsk_playlist=debug" } else { "slsk_playlist=info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    cli::run_command(&args)
}
