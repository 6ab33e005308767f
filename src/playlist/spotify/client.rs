//! Spotify Web API client
//!
//! With client id/secret a client-credentials token is requested once and
//! reused until the API rejects it, then fetched again. Without them requests
//! go out anonymously, which only works for whatever the API serves publicly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{adapter, dto};
use crate::model::TrackDescriptor;
use crate::playlist::{PlaylistError, PlaylistSource};

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Largest page the playlist tracks endpoint serves
const PAGE_LIMIT: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How a failed request should be reported
#[derive(Debug, Clone, Copy)]
enum Stage {
    Header,
    Tracks,
}

/// Spotify API client
pub struct SpotifyClient {
    http_client: reqwest::Client,
    api_base: String,
    token_url: String,
    credentials: Option<(String, String)>,
    token: RwLock<Option<String>>,
}

impl SpotifyClient {
    /// `credentials` is `(client_id, client_secret)`; `None` means anonymous.
    pub fn new(credentials: Option<(String, String)>) -> Result<Self, PlaylistError> {
        Self::with_endpoints(credentials, API_BASE, TOKEN_URL)
    }

    /// Client against custom endpoints
    pub fn with_endpoints(
        credentials: Option<(String, String)>,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Result<Self, PlaylistError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlaylistError::Network(e.to_string()))?;

        if credentials.is_none() {
            info!("Spotify anonymous mode - public playlists only");
        }

        Ok(Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            credentials,
            token: RwLock::new(None),
        })
    }

    pub fn is_anonymous(&self) -> bool {
        self.credentials.is_none()
    }

    /// Fetch and cache a client-credentials token.
    async fn access_token(&self) -> Result<Option<String>, PlaylistError> {
        let Some((ref id, ref secret)) = self.credentials else {
            return Ok(None);
        };
        if let Some(token) = self.token.read().await.clone() {
            return Ok(Some(token));
        }

        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(id, Some(secret))
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| PlaylistError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlaylistError::AuthRequired(format!(
                "token request rejected with HTTP {status}"
            )));
        }

        let token: dto::TokenResponse = response
            .json()
            .await
            .map_err(|e| PlaylistError::Parse(e.to_string()))?;
        debug!("Obtained Spotify token, expires in {:?}s", token.expires_in);

        *self.token.write().await = Some(token.access_token.clone());
        Ok(Some(token.access_token))
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response, PlaylistError> {
        let mut builder = self.http_client.get(url);
        if let Some(token) = self.access_token().await? {
            builder = builder.bearer_auth(token);
        }
        builder
            .send()
            .await
            .map_err(|e| PlaylistError::Network(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        stage: Stage,
        playlist_id: &str,
    ) -> Result<T, PlaylistError> {
        let mut response = self.send_get(url).await?;

        // Tokens expire after an hour; a long batch outlives the cached one
        if response.status() == StatusCode::UNAUTHORIZED && !self.is_anonymous() {
            debug!("Spotify token rejected, requesting a new one");
            *self.token.write().await = None;
            response = self.send_get(url).await?;
        }

        let status = response.status();
        match (stage, status) {
            (_, s) if s.is_success() => {}
            (Stage::Header, StatusCode::NOT_FOUND) => {
                return Err(PlaylistError::NotFound(playlist_id.to_string()));
            }
            (_, StatusCode::UNAUTHORIZED) | (Stage::Tracks, StatusCode::NOT_FOUND) => {
                return Err(PlaylistError::AuthRequired(playlist_id.to_string()));
            }
            _ => {
                let detail = match response.json::<dto::ApiError>().await {
                    Ok(body) => body.error.message,
                    Err(_) => status.canonical_reason().unwrap_or("Unknown").to_string(),
                };
                return Err(PlaylistError::Network(format!("HTTP {status}: {detail}")));
            }
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PlaylistError::Parse(e.to_string()))
    }

    /// All tracks of a playlist, following pagination.
    pub async fn playlist_tracks(&self, reference: &str) -> Result<Vec<TrackDescriptor>, PlaylistError> {
        let id = adapter::extract_playlist_id(reference)?;
        info!("Playlist id: {}", id);

        let header_url = format!("{}/playlists/{}", self.api_base, urlencoding::encode(&id));
        let playlist: dto::Playlist = self.get_json(&header_url, Stage::Header, &id).await?;
        let owner = playlist
            .owner
            .as_ref()
            .and_then(|o| o.display_name.as_deref())
            .unwrap_or("unknown");
        info!("Playlist: {} by {} ({})", playlist.name, owner, playlist.id);

        let mut tracks = Vec::new();
        let mut next = Some(format!("{header_url}/tracks?limit={PAGE_LIMIT}"));
        while let Some(url) = next {
            let page: dto::Paging<dto::PlaylistItem> = self.get_json(&url, Stage::Tracks, &id).await?;
            let fetched = page.items.len();
            let descriptors = adapter::to_descriptors(page.items);
            if descriptors.len() < fetched {
                debug!("Skipped {} non-track items", fetched - descriptors.len());
            }
            tracks.extend(descriptors);
            next = page.next;
        }

        if tracks.is_empty() {
            warn!("Playlist {} has no tracks", id);
        }
        info!("Found {} tracks", tracks.len());
        Ok(tracks)
    }
}

#[async_trait]
impl PlaylistSource for SpotifyClient {
    fn name(&self) -> &'static str {
        "spotify"
    }

    async fn fetch_tracks(&self, reference: &str) -> Result<Vec<TrackDescriptor>, PlaylistError> {
        self.playlist_tracks(reference).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    /// What the local Web API stand-in saw
    #[derive(Debug, Clone)]
    struct Request {
        method: String,
        path: String,
        bearer: Option<String>,
    }

    struct StubApi {
        base: String,
        requests: Arc<Mutex<Vec<Request>>>,
    }

    impl StubApi {
        /// Serve every request with `handler(request, base_url) -> (status, json body)`.
        async fn start<F>(handler: F) -> Self
        where
            F: Fn(&Request, &str) -> (u16, String) + Send + Sync + 'static,
        {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let requests = Arc::new(Mutex::new(Vec::new()));

            let handler = Arc::new(handler);
            let (seen, root) = (Arc::clone(&requests), base.clone());
            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let (handler, seen, root) = (Arc::clone(&handler), Arc::clone(&seen), root.clone());
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = handler(&request, &root);
                        seen.lock().unwrap().push(request);
                        let reply = format!(
                            "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(reply.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
            });

            Self { base, requests }
        }

        fn client(&self, credentials: Option<(&str, &str)>) -> SpotifyClient {
            SpotifyClient::with_endpoints(
                credentials.map(|(id, secret)| (id.to_string(), secret.to_string())),
                format!("{}/v1", self.base),
                format!("{}/token", self.base),
            )
            .unwrap()
        }

        fn count(&self, path_prefix: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.path.starts_with(path_prefix))
                .count()
        }
    }

    async fn read_request(socket: &mut TcpStream) -> Option<Request> {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.ok()?;
            if n == 0 {
                return None;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let mut lines = head.lines();
        let mut request_line = lines.next()?.split_whitespace();
        let method = request_line.next()?.to_string();
        let path = request_line.next()?.to_string();

        let mut bearer = None;
        let mut content_length = 0;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match name.to_ascii_lowercase().as_str() {
                "authorization" => bearer = value.strip_prefix("Bearer ").map(str::to_string),
                "content-length" => content_length = value.parse().unwrap_or(0),
                _ => {}
            }
        }

        // Drain the body so closing the socket doesn't reset the connection
        while buf.len() < head_end + content_length {
            let n = socket.read(&mut chunk).await.ok()?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        Some(Request { method, path, bearer })
    }

    const HEADER: &str = r#"{"id":"abc","name":"Mix","owner":{"display_name":"dj"}}"#;

    fn page(titles: &[&str], next: Option<String>) -> String {
        let items: Vec<_> = titles
            .iter()
            .map(|t| {
                serde_json::json!({
                    "track": {"name": t, "type": "track", "artists": [{"name": "Artist"}]}
                })
            })
            .collect();
        serde_json::json!({ "items": items, "next": next }).to_string()
    }

    fn error_body(status: u16) -> String {
        serde_json::json!({"error": {"status": status, "message": "stub"}}).to_string()
    }

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new(None).unwrap();
        assert_eq!(client.api_base, API_BASE);
        assert!(client.is_anonymous());
    }

    #[test]
    fn test_client_with_custom_endpoints() {
        let client = SpotifyClient::with_endpoints(
            Some(("id".to_string(), "secret".to_string())),
            "http://localhost:8080/v1/",
            "http://localhost:8080/token",
        )
        .unwrap();
        assert_eq!(client.api_base, "http://localhost:8080/v1");
        assert!(!client.is_anonymous());
    }

    #[tokio::test]
    async fn test_invalid_reference_makes_no_request() {
        // Unroutable base: any request would surface as a network error
        let client =
            SpotifyClient::with_endpoints(None, "http://127.0.0.1:9", "http://127.0.0.1:9").unwrap();
        let err = client.playlist_tracks("spotify:album:xyz").await.unwrap_err();
        assert!(matches!(err, PlaylistError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_anonymous_client_has_no_token() {
        let client = SpotifyClient::new(None).unwrap();
        assert!(client.access_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_playlist_is_not_found() {
        let api = StubApi::start(|_, _| (404, error_body(404))).await;

        let err = api.client(None).playlist_tracks("abc").await.unwrap_err();

        assert!(matches!(err, PlaylistError::NotFound(ref id) if id == "abc"));
        assert_eq!(api.count("/v1/playlists/abc"), 1);
    }

    #[tokio::test]
    async fn test_hidden_tracks_need_auth() {
        for status in [404, 401] {
            let api = StubApi::start(move |req, _| match req.path.as_str() {
                "/v1/playlists/abc" => (200, HEADER.to_string()),
                _ => (status, error_body(status)),
            })
            .await;

            let err = api.client(None).playlist_tracks("abc").await.unwrap_err();

            assert!(
                matches!(err, PlaylistError::AuthRequired(ref id) if id == "abc"),
                "HTTP {status} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_anonymous_header_rejection_needs_auth() {
        let api = StubApi::start(|_, _| (401, error_body(401))).await;

        let err = api.client(None).playlist_tracks("abc").await.unwrap_err();

        assert!(matches!(err, PlaylistError::AuthRequired(_)));
        // No credentials, so nothing to refresh and no retry
        assert_eq!(api.count("/v1/"), 1);
        assert_eq!(api.count("/token"), 0);
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let api = StubApi::start(|_, _| (503, error_body(503))).await;

        let err = api.client(None).playlist_tracks("abc").await.unwrap_err();

        assert!(matches!(err, PlaylistError::Network(ref msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_follows_next_pages() {
        let api = StubApi::start(|req, base| match req.path.as_str() {
            "/v1/playlists/abc" => (200, HEADER.to_string()),
            "/v1/playlists/abc/tracks?limit=100" => (
                200,
                page(
                    &["One", "Two"],
                    Some(format!("{base}/v1/playlists/abc/tracks?offset=2&limit=100")),
                ),
            ),
            "/v1/playlists/abc/tracks?offset=2&limit=100" => (200, page(&["Three"], None)),
            _ => (404, error_body(404)),
        })
        .await;

        let tracks = api.client(None).playlist_tracks("spotify:playlist:abc").await.unwrap();

        let titles: Vec<_> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
        assert!(tracks.iter().all(|t| t.artist == "Artist"));
        assert_eq!(api.count("/v1/playlists/abc/tracks"), 2);
        assert!(api.requests.lock().unwrap().iter().all(|r| r.method == "GET"));
    }

    #[tokio::test]
    async fn test_rejected_token_is_refreshed_once() {
        let issued = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&issued);
        let api = StubApi::start(move |req, _| {
            if req.path == "/token" {
                let token = match counter.fetch_add(1, Ordering::SeqCst) {
                    0 => "stale",
                    _ => "fresh",
                };
                return (200, format!(r#"{{"access_token":"{token}","expires_in":3600}}"#));
            }
            if req.bearer.as_deref() != Some("fresh") {
                return (401, error_body(401));
            }
            match req.path.as_str() {
                "/v1/playlists/abc" => (200, HEADER.to_string()),
                _ => (200, page(&["Only"], None)),
            }
        })
        .await;

        let tracks = api
            .client(Some(("id", "secret")))
            .playlist_tracks("abc")
            .await
            .unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(issued.load(Ordering::SeqCst), 2);
        assert_eq!(api.count("/v1/playlists/abc"), 3);
        let requests = api.requests.lock().unwrap();
        assert!(requests.iter().filter(|r| r.path == "/token").all(|r| r.method == "POST"));
    }

    #[tokio::test]
    async fn test_rejected_fresh_token_needs_auth() {
        let api = StubApi::start(|req, _| match req.path.as_str() {
            "/token" => (200, r#"{"access_token":"t"}"#.to_string()),
            _ => (401, error_body(401)),
        })
        .await;

        let err = api
            .client(Some(("id", "secret")))
            .playlist_tracks("abc")
            .await
            .unwrap_err();

        assert!(matches!(err, PlaylistError::AuthRequired(_)));
        assert_eq!(api.count("/token"), 2);
        assert_eq!(api.count("/v1/playlists/abc"), 2);
    }
}
