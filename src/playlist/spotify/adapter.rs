//! Spotify DTO to domain conversion.

use std::sync::LazyLock;

use regex::Regex;

use super::dto;
use crate::model::TrackDescriptor;
use crate::playlist::PlaylistError;

static PLAYLIST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://open\.spotify\.com/(?:intl-[a-z]+/)?playlist/([A-Za-z0-9]+)")
        .expect("valid playlist url pattern")
});

static PLAYLIST_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^spotify:playlist:([A-Za-z0-9]+)$").expect("valid playlist uri pattern")
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid playlist id pattern"));

/// Accepts a share URL, a `spotify:playlist:` URI or a bare id.
pub fn extract_playlist_id(reference: &str) -> Result<String, PlaylistError> {
    let reference = reference.trim();
    if let Some(caps) = PLAYLIST_URL
        .captures(reference)
        .or_else(|| PLAYLIST_URI.captures(reference))
    {
        return Ok(caps[1].to_string());
    }
    if BARE_ID.is_match(reference) {
        return Ok(reference.to_string());
    }
    Err(PlaylistError::InvalidReference(reference.to_string()))
}

/// Keep real tracks; artists are joined with `", "`.
pub fn to_descriptors(items: Vec<dto::PlaylistItem>) -> Vec<TrackDescriptor> {
    items
        .into_iter()
        .filter_map(|item| item.track)
        .filter(|track| track.kind == "track")
        .map(to_descriptor)
        .collect()
}

fn to_descriptor(track: dto::Track) -> TrackDescriptor {
    let artist = track
        .artists
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    TrackDescriptor {
        artist,
        title: track.name,
        album: track.album.map(|a| a.name),
        duration_ms: track.duration_ms,
    }
}
