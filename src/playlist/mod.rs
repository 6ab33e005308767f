//! Playlist sources.
//!
//! Everything that can turn a reference into a track list sits behind
//! [`PlaylistSource`], so the resolver never knows where tracks came from:
//! - [`spotify`]: catalog playlists by URL, URI or id
//! - [`file`]: local JSON or `Artist - Title` text lists
//! - [`command`]: an external scraper printing JSON on stdout

pub mod command;
pub mod file;
pub mod spotify;

use async_trait::async_trait;

use crate::model::TrackDescriptor;

pub use command::CommandSource;
pub use file::FileSource;
pub use spotify::SpotifyClient;

/// Errors while fetching a track list. All of them abort the batch.
#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("invalid playlist reference: {0}")]
    InvalidReference(String),

    /// Absent, or private without credentials
    #[error("playlist not found or private: {0}")]
    NotFound(String),

    #[error("playlist requires authentication: {0}")]
    AuthRequired(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse track list: {0}")]
    Parse(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("scraper command failed: {0}")]
    Command(String),
}

impl PlaylistError {
    /// True for failures a retry with credentials could fix.
    pub fn needs_credentials(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::AuthRequired(_))
    }
}

/// Anything that can produce a track list from a reference.
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn fetch_tracks(&self, reference: &str) -> Result<Vec<TrackDescriptor>, PlaylistError>;
}
