//! slskd HTTP client
//!
//! Talks to the daemon's v0 control API. See: https://github.com/slskd/slskd/blob/master/docs/api.md
//!
//! ## Authentication
//!
//! - With an API key, every request carries `X-API-Key` and no session is needed.
//! - Without one, [`SlskdClient::authenticate`] exchanges the web UI
//!   username/password for a JWT via `POST /session`, which is then sent as a
//!   bearer token. The token lives inside the client, so one client is one session.
//! - Diagnostic probes send HTTP basic auth and the API key, whichever is
//!   configured, and never fail on a bad status.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::domain::{CandidateFile, CandidateResult, DaemonError, LinkState, ProbeResponse, SearchJob, SearchState};
use super::{adapter, dto};

const API_PREFIX: &str = "/api/v0";

/// How much of an error or probe body to keep
const BODY_PREVIEW_CHARS: usize = 500;

/// Credentials for the daemon's web API
#[derive(Debug, Clone, Default)]
pub struct DaemonCredentials {
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_key: Option<String>,
}

/// slskd API client
pub struct SlskdClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: DaemonCredentials,
    probe_timeout: Duration,
    token: RwLock<Option<String>>,
}

impl SlskdClient {
    /// Create a client for an already-normalized base URL (scheme + host + port).
    ///
    /// `request_timeout` bounds every control API call; probes use the
    /// shorter `probe_timeout`.
    pub fn new(
        base_url: impl Into<String>,
        credentials: DaemonCredentials,
        probe_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, DaemonError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .timeout(request_timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            probe_timeout,
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Start a request with whichever authentication is available.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http_client.request(method, self.api_url(path));
        if let Some(ref key) = self.credentials.api_key {
            return builder.header("X-API-Key", key);
        }
        match self.token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, DaemonError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(DaemonError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DaemonError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DaemonError> {
        let builder = self.request(Method::GET, path).await;
        self.send(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| DaemonError::Parse(e.to_string()))
    }

    /// Obtain a session token unless an API key makes it unnecessary.
    pub async fn authenticate(&self) -> Result<(), DaemonError> {
        if self.credentials.api_key.is_some() {
            return Ok(());
        }
        let (Some(username), Some(password)) = (
            self.credentials.username.as_deref(),
            self.credentials.password.as_deref(),
        ) else {
            return Err(DaemonError::Unauthorized);
        };

        let builder = self
            .http_client
            .post(self.api_url("/session"))
            .json(&dto::SessionRequest { username, password });
        let session: dto::SessionToken = self
            .send(builder)
            .await?
            .json()
            .await
            .map_err(|e| DaemonError::Parse(e.to_string()))?;

        *self.token.write().await = Some(session.token);
        tracing::debug!("Obtained slskd session token");
        Ok(())
    }

    /// Diagnostic GET relative to the base URL; any status is a successful probe.
    pub async fn probe(&self, path: &str) -> Result<ProbeResponse, DaemonError> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http_client.get(&url).timeout(self.probe_timeout);
        if let (Some(user), Some(pass)) = (
            self.credentials.username.as_deref(),
            self.credentials.password.as_deref(),
        ) {
            builder = builder.basic_auth(user, Some(pass));
        }
        if let Some(ref key) = self.credentials.api_key {
            builder = builder.header("X-API-Key", key);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response.text().await.unwrap_or_default();
        let mut body_preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
        if body.chars().count() > BODY_PREVIEW_CHARS {
            body_preview.push_str("...");
        }

        Ok(ProbeResponse {
            status,
            content_type,
            body_preview,
        })
    }

    pub async fn application_state(&self) -> Result<String, DaemonError> {
        let state: dto::ApplicationState = self.get_json("/application").await?;
        Ok(adapter::describe_application(&state))
    }

    pub async fn application_version(&self) -> Result<String, DaemonError> {
        // The endpoint returns a bare JSON string
        self.get_json::<String>("/application/version").await
    }

    pub async fn link_state(&self) -> Result<LinkState, DaemonError> {
        let server: dto::ServerState = self.get_json("/server").await?;
        Ok(adapter::to_link_state(&server))
    }

    /// Ask the daemon to (re)connect to the P2P network.
    pub async fn connect_link(&self) -> Result<(), DaemonError> {
        let builder = self.request(Method::PUT, "/server").await;
        self.send(builder).await?;
        Ok(())
    }

    pub async fn start_search(&self, query: &str) -> Result<SearchJob, DaemonError> {
        let builder = self
            .request(Method::POST, "/searches")
            .await
            .json(&dto::SearchRequest {
                search_text: query,
            });
        let search: dto::Search = self
            .send(builder)
            .await?
            .json()
            .await
            .map_err(|e| DaemonError::Parse(e.to_string()))?;
        Ok(adapter::to_search_job(search))
    }

    pub async fn search_state(&self, id: &str) -> Result<SearchState, DaemonError> {
        let path = format!("/searches/{}", urlencoding::encode(id));
        let search: dto::Search = self.get_json(&path).await?;
        Ok(adapter::to_search_job(search).state)
    }

    pub async fn search_responses(&self, id: &str) -> Result<Vec<CandidateResult>, DaemonError> {
        let path = format!("/searches/{}/responses", urlencoding::encode(id));
        let responses: Vec<dto::SearchResponse> = self.get_json(&path).await?;
        Ok(adapter::to_candidates(responses))
    }

    /// Queue files from one peer. Acceptance is not completion.
    pub async fn enqueue(&self, username: &str, files: &[CandidateFile]) -> Result<(), DaemonError> {
        let path = format!("/transfers/downloads/{}", urlencoding::encode(username));
        let builder = self
            .request(Method::POST, &path)
            .await
            .json(&adapter::to_queued_files(files));
        self.send(builder).await?;
        Ok(())
    }
}
