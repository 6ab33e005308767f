//! Internal domain models for the slskd control API.
//!
//! These types are OUR types - they don't change when the daemon's JSON
//! changes. Every response is converted into these via the adapter.

use std::fmt;

/// One file offered by a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Peer that shares the file
    pub username: String,
    /// Full remote path as reported by the peer
    pub filename: String,
    pub size_bytes: u64,
    pub bitrate_kbps: Option<u32>,
    /// Lower-case extension without the dot
    pub container_ext: String,
}

/// All matching files one peer returned for a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    pub owner: String,
    pub files: Vec<CandidateFile>,
}

impl CandidateResult {
    /// The file used to classify the whole result.
    pub fn first_file(&self) -> Option<&CandidateFile> {
        self.files.first()
    }
}

/// Lifecycle of a search job on the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    InProgress,
    Completed,
    Errored,
    TimedOut,
}

impl SearchState {
    /// Map the daemon's flag string (e.g. `"Completed, TimedOut"`).
    ///
    /// Anything that is not marked completed is still running.
    pub fn from_flags(flags: &str) -> Self {
        let has = |flag: &str| flags.split(',').any(|f| f.trim().eq_ignore_ascii_case(flag));
        if has("Errored") {
            Self::Errored
        } else if has("TimedOut") {
            Self::TimedOut
        } else if has("Completed") {
            Self::Completed
        } else {
            Self::InProgress
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// A search submitted to the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchJob {
    pub id: String,
    pub state: SearchState,
}

/// The daemon's own connection to the P2P network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    /// Connecting, connected but not yet logged in, or logging in
    Transitional(String),
    /// Connected and authenticated
    LoggedIn,
    /// Anything the daemon reports that we don't recognise
    Other(String),
}

impl LinkState {
    pub fn from_flags(flags: &str) -> Self {
        let normalized: Vec<String> = flags
            .split(',')
            .map(|f| f.trim().to_ascii_lowercase().replace(' ', ""))
            .filter(|f| !f.is_empty())
            .collect();
        let has = |flag: &str| normalized.iter().any(|f| f == flag);

        if has("loggedin") {
            Self::LoggedIn
        } else if has("disconnected") {
            Self::Disconnected
        } else if has("connecting") || has("connected") || has("loggingin") {
            Self::Transitional(flags.to_string())
        } else {
            Self::Other(flags.to_string())
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => f.write_str("Disconnected"),
            Self::LoggedIn => f.write_str("Connected, LoggedIn"),
            Self::Transitional(s) | Self::Other(s) => f.write_str(s),
        }
    }
}

/// Result of a diagnostic GET against the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// First few hundred characters of the body
    pub body_preview: String,
}

/// Errors talking to the daemon
#[derive(Debug, Clone, thiserror::Error)]
pub enum DaemonError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Authentication rejected by daemon")]
    Unauthorized,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for DaemonError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_state_flags() {
        assert_eq!(SearchState::from_flags("InProgress"), SearchState::InProgress);
        assert_eq!(SearchState::from_flags("Requested"), SearchState::InProgress);
        assert_eq!(
            SearchState::from_flags("Completed, ResponseLimitReached"),
            SearchState::Completed
        );
        assert_eq!(SearchState::from_flags("Completed, TimedOut"), SearchState::TimedOut);
        assert_eq!(SearchState::from_flags("Completed, Errored"), SearchState::Errored);
        assert!(!SearchState::InProgress.is_terminal());
        assert!(SearchState::TimedOut.is_terminal());
    }

    #[test]
    fn test_link_state_flags() {
        assert_eq!(LinkState::from_flags("Connected, LoggedIn"), LinkState::LoggedIn);
        assert_eq!(LinkState::from_flags("Disconnected"), LinkState::Disconnected);
        assert!(matches!(
            LinkState::from_flags("Connected, LoggingIn"),
            LinkState::Transitional(_)
        ));
        assert!(matches!(LinkState::from_flags("Logging in"), LinkState::Transitional(_)));
        assert!(matches!(LinkState::from_flags("Connecting"), LinkState::Transitional(_)));
        assert!(matches!(LinkState::from_flags("Banana"), LinkState::Other(_)));
    }

    #[test]
    fn test_link_state_display_round_trips_logged_in() {
        assert_eq!(
            LinkState::from_flags(&LinkState::LoggedIn.to_string()),
            LinkState::LoggedIn
        );
    }
}
