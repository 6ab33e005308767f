//! Spotify Web API Data Transfer Objects
//!
//! These types match what the Web API returns for the few endpoints used.
//! DO NOT use these types outside the spotify module - convert to domain types.
//!
//! API Reference: https://developer.spotify.com/documentation/web-api

use serde::Deserialize;

/// Client-credentials token response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Playlist header (`GET /playlists/{id}`)
#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub display_name: Option<String>,
}

/// One page of a paged collection
#[derive(Debug, Clone, Deserialize)]
pub struct Paging<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Absolute URL of the next page
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Playlist entry; `track` is null for removed or local items
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

/// Track or episode object
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: String,
    /// `"track"` or `"episode"`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumRef {
    pub name: String,
}

/// Error body, `{"error": {"status": 404, "message": "..."}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_with_null_and_episode_items() {
        let json = r#"{
            "items": [
                {"track": {"name": "Song", "type": "track", "id": "t1",
                           "artists": [{"name": "A"}, {"name": "B"}],
                           "album": {"name": "LP"}, "duration_ms": 200000}},
                {"track": null},
                {"track": {"name": "Pod", "type": "episode", "duration_ms": 3600000}}
            ],
            "next": null,
            "total": 3
        }"#;
        let page: Paging<PlaylistItem> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 3);
        assert!(page.items[1].track.is_none());
        assert_eq!(page.items[2].track.as_ref().unwrap().kind, "episode");
        assert!(page.items[2].track.as_ref().unwrap().artists.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_error_body() {
        let err: ApiError =
            serde_json::from_str(r#"{"error":{"status":404,"message":"Resource not found"}}"#)
                .unwrap();
        assert_eq!(err.error.status, 404);
    }
}
