//! Track lists from an external scraper.
//!
//! The command gets the reference (a URL, a cookie, whatever the scraper
//! expects) as its last argument and must print a JSON array of albums:
//!
//! ```json
//! [{"artist": "Artist", "album": "Album", "tracks": ["One", "Two"]}]
//! ```

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use super::{PlaylistError, PlaylistSource};
use crate::model::TrackDescriptor;

/// One album as printed by the scraper
#[derive(Debug, Clone, Deserialize)]
struct ScrapedAlbum {
    artist: String,
    #[serde(default)]
    album: Option<String>,
    #[serde(default)]
    tracks: Vec<String>,
}

/// Runs `program args... <reference>` and parses its stdout.
#[derive(Debug, Clone)]
pub struct CommandSource {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl PlaylistSource for CommandSource {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn fetch_tracks(&self, reference: &str) -> Result<Vec<TrackDescriptor>, PlaylistError> {
        debug!("Running scraper {}", self.program.display());
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(reference)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PlaylistError::Command(format!("{}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlaylistError::Command(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let tracks = parse_albums(&output.stdout)?;
        info!("Scraper returned {} tracks", tracks.len());
        Ok(tracks)
    }
}

/// Flatten scraped albums into one descriptor per track title.
fn parse_albums(stdout: &[u8]) -> Result<Vec<TrackDescriptor>, PlaylistError> {
    let albums: Vec<ScrapedAlbum> =
        serde_json::from_slice(stdout).map_err(|e| PlaylistError::Parse(e.to_string()))?;

    Ok(albums
        .into_iter()
        .flat_map(|album| {
            let ScrapedAlbum {
                artist,
                album,
                tracks,
            } = album;
            tracks.into_iter().map(move |title| TrackDescriptor {
                artist: artist.clone(),
                title,
                album: album.clone(),
                duration_ms: None,
            })
        })
        .collect())
}
