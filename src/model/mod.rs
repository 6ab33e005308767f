//! Core data models shared by the playlist sources and the resolver.
//!
//! - [`TrackDescriptor`]: what a playlist source says should be downloaded
//! - [`DownloadOutcome`]: what happened to one descriptor
//! - [`BatchSummary`]: the `successful/total` view of a batch

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolve::{DownloadError, SearchError};

/// A track as described by a playlist source.
///
/// Title and artist are free text straight from the source and are not
/// normalized here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDescriptor {
    pub artist: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl TrackDescriptor {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            album: None,
            duration_ms: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

impl fmt::Display for TrackDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

/// A transfer the daemon accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueuedDownload {
    /// Peer the files are requested from
    pub username: String,
    /// First (classified) file of the enqueued set
    pub filename: String,
    /// Number of files handed to the daemon
    pub file_count: usize,
}

/// Why a single track could not be enqueued.
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// The search completed with zero responses
    #[error("no results found")]
    NoResults,

    /// Responses existed but none passed the format/quality policy
    #[error("no acceptable candidate among {0} results")]
    NoMatch(usize),

    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// The batch shut down before this track got a slot
    #[error("aborted before processing")]
    Aborted,
}

impl TrackError {
    /// Short machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Search(e) => e.reason(),
            Self::NoResults => "no-results",
            Self::NoMatch(_) => "no-match",
            Self::Download(e) => e.reason(),
            Self::Aborted => "aborted",
        }
    }

    /// A failed or timed-out search, an empty result set and a result set
    /// with nothing good enough all read as not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Search(_) | Self::NoResults | Self::NoMatch(_))
    }
}

/// Terminal result for one input track.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub track: TrackDescriptor,
    pub result: Result<EnqueuedDownload, TrackError>,
}

impl DownloadOutcome {
    pub fn success(track: TrackDescriptor, enqueued: EnqueuedDownload) -> Self {
        Self {
            track,
            result: Ok(enqueued),
        }
    }

    pub fn failure(track: TrackDescriptor, error: impl Into<TrackError>) -> Self {
        Self {
            track,
            result: Err(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&TrackError> {
        self.result.as_ref().err()
    }
}

/// Aggregate view over a batch of outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub successful: usize,
    pub total: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[DownloadOutcome]) -> Self {
        Self {
            successful: outcomes.iter().filter(|o| o.is_success()).count(),
            total: outcomes.len(),
        }
    }

    pub fn failed(&self) -> usize {
        self.total - self.successful
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.successful, self.total)
    }
}
