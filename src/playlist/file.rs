//! Track lists from local files.
//!
//! Two formats, picked by content:
//! - a JSON array of `{artist, title, album?, durationMs?}`
//! - plain text, one `Artist - Title` per line; blank lines and `#` comments
//!   are ignored

use std::path::Path;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{PlaylistError, PlaylistSource};
use crate::model::TrackDescriptor;

const SEPARATOR: &str = " - ";

/// Reads the reference as a file path
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl FileSource {
    pub fn new() -> Self {
        Self
    }

    pub async fn load(&self, path: &Path) -> Result<Vec<TrackDescriptor>, PlaylistError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PlaylistError::Read {
                path: path.display().to_string(),
                source,
            })?;

        let tracks = parse(&contents)?;
        info!("Loaded {} tracks from {}", tracks.len(), path.display());
        Ok(tracks)
    }
}

#[async_trait]
impl PlaylistSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn fetch_tracks(&self, reference: &str) -> Result<Vec<TrackDescriptor>, PlaylistError> {
        self.load(Path::new(reference)).await
    }
}

/// Parse either format.
pub fn parse(contents: &str) -> Result<Vec<TrackDescriptor>, PlaylistError> {
    if contents.trim_start().starts_with('[') {
        return serde_json::from_str(contents).map_err(|e| PlaylistError::Parse(e.to_string()));
    }
    Ok(parse_lines(contents))
}

fn parse_lines(contents: &str) -> Vec<TrackDescriptor> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            match line.split_once(SEPARATOR) {
                Some((artist, title)) => Some(TrackDescriptor::new(artist.trim(), title.trim())),
                None => {
                    warn!("Line {}: expected \"Artist - Title\", skipping {:?}", index + 1, line);
                    None
                }
            }
        })
        .collect()
}
