//! Playlist download and track listing commands.

use tokio::runtime::Runtime;
use tracing::{info, warn};

use super::{SourceArgs, daemon_client, playlist_source};
use crate::config::Config;
use crate::error::{Result, ResultExt};
use crate::model::{BatchSummary, DownloadOutcome, TrackDescriptor};
use crate::playlist::PlaylistSource;
use crate::resolve::Resolver;
use crate::slskd::DaemonApi;

/// Resolve a whole playlist and queue the downloads
pub fn cmd_download(
    rt: &Runtime,
    mut config: Config,
    source: &SourceArgs,
    reference: &str,
    concurrency: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(n) = concurrency {
        config.download.max_concurrent = n;
    }
    config.validate()?;
    config.ensure_download_dir()?;

    let playlist = playlist_source(&config, source)?;
    let client = daemon_client(&config)?;

    rt.block_on(async {
        let tracks = fetch(playlist.as_ref(), reference).await?;
        if tracks.is_empty() {
            println!("No tracks to download.");
            return Ok(());
        }
        println!("Found {} tracks", tracks.len());
        info!("Download directory: {}", config.download.directory.display());

        let mut resolver = Resolver::from_config(client, &config);
        let outcomes = run_batch(&mut resolver, &tracks).await?;
        print_report(&outcomes);
        Ok(())
    })
}

async fn run_batch<D: DaemonApi>(
    resolver: &mut Resolver<D>,
    tracks: &[TrackDescriptor],
) -> Result<Vec<DownloadOutcome>> {
    let outcomes = resolver.download_all(tracks).await?;
    Ok(outcomes)
}

/// Print the tracks a source yields
pub fn cmd_tracks(rt: &Runtime, config: &Config, source: &SourceArgs, reference: &str) -> anyhow::Result<()> {
    let playlist = playlist_source(config, source)?;

    rt.block_on(async {
        let tracks = fetch(playlist.as_ref(), reference).await?;
        for (i, track) in tracks.iter().enumerate() {
            match track.album {
                Some(ref album) => println!("{:>4}. {} [{}]", i + 1, track, album),
                None => println!("{:>4}. {}", i + 1, track),
            }
        }
        println!("{} tracks", tracks.len());
        Ok(())
    })
}

async fn fetch(source: &dyn PlaylistSource, reference: &str) -> Result<Vec<TrackDescriptor>> {
    info!("Fetching tracks from {} source", source.name());
    source
        .fetch_tracks(reference)
        .await
        .inspect_err(|e| {
            if e.needs_credentials() && source.name() == "spotify" {
                warn!("Private playlists need SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET");
            }
        })
        .with_context(format!("fetching {} playlist {:?}", source.name(), reference))
}

fn print_report(outcomes: &[DownloadOutcome]) {
    let summary = BatchSummary::from_outcomes(outcomes);
    println!();
    println!("Enqueued {} tracks", summary);

    let (not_found, failed): (Vec<_>, Vec<_>) = outcomes
        .iter()
        .filter_map(|o| o.error().map(|e| (&o.track, e)))
        .partition(|(_, e)| e.is_not_found());

    for (heading, group) in [("Not found:", not_found), ("Failed:", failed)] {
        if group.is_empty() {
            continue;
        }
        println!("{heading}");
        for (track, err) in group {
            println!("  {} [{}] {}", track, err.reason(), err);
        }
    }
}
