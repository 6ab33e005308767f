//! Spotify playlist source
//!
//! Reads public (or, with client credentials, app-visible) playlists.
//!
//! API docs: https://developer.spotify.com/documentation/web-api

pub mod dto;
mod adapter;
mod client;

pub use adapter::extract_playlist_id;
pub use client::SpotifyClient;
