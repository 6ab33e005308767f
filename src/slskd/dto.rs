//! slskd API Data Transfer Objects
//!
//! These types match what the slskd v0 API sends and expects.
//! DO NOT use these types outside the slskd module - convert to domain types.
//!
//! Example search response entry:
//! ```json
//! {
//!   "username": "peer42",
//!   "fileCount": 1,
//!   "hasFreeUploadSlot": true,
//!   "queueLength": 0,
//!   "uploadSpeed": 1048576,
//!   "files": [{
//!     "filename": "Music\\Artist\\Album\\01 - Title.mp3",
//!     "size": 9876543,
//!     "bitRate": 320,
//!     "extension": "mp3",
//!     "length": 245
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// `GET /application`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationState {
    pub version: Option<ApplicationVersion>,
    pub server: Option<ServerState>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationVersion {
    pub full: Option<String>,
    pub current: Option<String>,
    pub is_update_available: Option<bool>,
}

/// `GET /server`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerState {
    pub state: String,
    pub is_connected: bool,
    pub is_logged_in: bool,
    pub is_transitioning: bool,
    pub username: Option<String>,
    pub address: Option<String>,
}

/// `POST /session`
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionToken {
    pub token: String,
}

/// `POST /searches`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest<'a> {
    pub search_text: &'a str,
}

/// `POST /searches` and `GET /searches/{id}`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    pub id: String,
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub response_count: u32,
    #[serde(default)]
    pub file_count: u32,
}

/// One entry of `GET /searches/{id}/responses`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub files: Vec<SearchFile>,
    #[serde(default)]
    pub file_count: u32,
    #[serde(default)]
    pub has_free_upload_slot: bool,
    #[serde(default)]
    pub queue_length: u64,
    #[serde(default)]
    pub upload_speed: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFile {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    pub bit_rate: Option<u32>,
    pub extension: Option<String>,
    pub length: Option<u32>,
}

/// Body element of `POST /transfers/downloads/{username}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedFile {
    pub filename: String,
    pub size: u64,
}
