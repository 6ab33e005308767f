//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`, while
//! CLI/main uses `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`Error`]: Top-level error for batch-level failures
//! - Module-specific errors (e.g., [`ConnectionError`], [`PlaylistError`]) for detailed handling
//! - Per-track failures never reach this type; they are carried inside
//!   [`crate::model::DownloadOutcome`]
//!
//! # Example
//!
//! ```ignore
//! use slsk_playlist::error::{Error, Result};
//!
//! async fn run(source: &dyn PlaylistSource, reference: &str) -> Result<()> {
//!     let tracks = source.fetch_tracks(reference).await?; // Playlist errors auto-convert
//!     resolver.download_all(&tracks).await?;               // Connection errors auto-convert
//!     Ok(())
//! }
//! ```

use crate::config::ConfigError;
use crate::playlist::PlaylistError;
use crate::resolve::ConnectionError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
///
/// Only the failures that abort a whole batch end up here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad or missing settings
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Daemon unreachable or P2P link never authenticated
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Playlist source could not produce a track list
    #[error("Playlist error: {0}")]
    Playlist(#[from] PlaylistError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, PlaylistError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Playlist(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_display() {
        let err: Error = ConnectionError::LinkTimeout {
            last_state: "Disconnected".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("Connection error"));
        assert!(msg.contains("Disconnected"));
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::Playlist(PlaylistError::NotFound("abc".to_string()))
            .context("while loading playlist");
        let msg = err.to_string();
        assert!(msg.contains("while loading playlist"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), PlaylistError> =
            Err(PlaylistError::AuthRequired("xyz".to_string()));
        let with_ctx = result.with_context("fetching tracks");
        assert!(with_ctx.unwrap_err().to_string().contains("fetching tracks"));
    }

    #[test]
    fn test_missing_credentials_converts() {
        let err: Error = ConfigError::MissingCredentials(vec!["SLSKD_PASSWORD".to_string()]).into();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("SLSKD_PASSWORD"));
    }
}
