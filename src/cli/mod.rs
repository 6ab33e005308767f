//! Command-line interface for slsk-playlist.
//!
//! This module provides CLI commands for fetching playlists, resolving them
//! against slskd and checking the daemon.

mod commands;

pub use commands::{Cli, Commands, SourceKind, run_command};
