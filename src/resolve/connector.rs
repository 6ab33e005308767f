//! Daemon connection: URL normalization, reachability probes and P2P login.
//!
//! [`Connector::connect`] runs once per batch:
//! 1. probe a few fixed endpoints and log what looks wrong (never fatal)
//! 2. make sure the control API answers (application state, version as fallback)
//! 3. make sure the daemon itself is logged into the P2P network, polling under a
//!    bounded [`RetryPolicy`]
//!
//! [`Connector::session`] wraps this in a guard that marks the connection
//! disconnected again when the batch ends.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::{ConfigError, DaemonConfig};
use crate::slskd::{DaemonApi, DaemonError, LinkState};

/// Endpoints hit by the diagnostic probe, relative to the base URL
pub const PROBE_PATHS: &[&str] = &["", "/api/v0/application/version", "/api/v0/application"];

/// Prefix the insecure scheme when missing and attach the configured port.
pub fn normalize_base_url(host: &str, port: u16) -> Result<String, ConfigError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ConfigError::InvalidUrl("host is empty".to_string()));
    }

    let candidate = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        let with_scheme = format!("http://{host}");
        info!("Added scheme to daemon URL: {}", with_scheme);
        with_scheme
    };

    let mut url = reqwest::Url::parse(&candidate)
        .map_err(|e| ConfigError::InvalidUrl(format!("{candidate}: {e}")))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!("{candidate}: no host")));
    }
    if url.port().is_none() && url.set_port(Some(port)).is_err() {
        return Err(ConfigError::InvalidUrl(format!("{candidate}: cannot set port")));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Connection state as seen by this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    ConnectedLoggedIn,
}

/// Bounded wait for the daemon's P2P login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Polls before giving up
    pub max_attempts: u32,
    /// Delay before each poll
    pub poll_interval: Duration,
    /// While still disconnected, reissue the connect command every this many polls
    /// once this many have passed. Zero disables reissuing.
    pub reconnect_after: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            poll_interval: Duration::from_secs(1),
            reconnect_after: 5,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &DaemonConfig) -> Self {
        Self {
            max_attempts: config.link_attempts,
            poll_interval: Duration::from_millis(config.link_poll_interval_ms),
            reconnect_after: config.reconnect_after,
        }
    }

    /// Attempts are 1-based. With `reconnect_after = 5` this is 6, 11, 16...
    pub fn should_reconnect(&self, attempt: u32) -> bool {
        self.reconnect_after > 0
            && attempt > self.reconnect_after
            && (attempt - 1) % self.reconnect_after == 0
    }
}

/// What a non-2xx probe status most likely means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeIssue {
    AuthFailure,
    Forbidden,
    NotFound,
    DaemonFault(u16),
}

impl ProbeIssue {
    pub fn classify(status: u16) -> Option<Self> {
        match status {
            401 => Some(Self::AuthFailure),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            s if s >= 500 => Some(Self::DaemonFault(s)),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::AuthFailure => "authentication failed (401) - check username/password/API key".to_string(),
            Self::Forbidden => "forbidden (403) - insufficient permissions".to_string(),
            Self::NotFound => "endpoint not found (404) - check the URL and slskd version".to_string(),
            Self::DaemonFault(s) => format!("daemon error ({s})"),
        }
    }
}

/// Errors that abort a batch before any track is processed
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("invalid daemon settings: {0}")]
    Config(#[from] ConfigError),

    #[error("daemon control API unreachable: {0}")]
    Unreachable(#[source] DaemonError),

    #[error("failed to query P2P link state: {0}")]
    Link(#[source] DaemonError),

    #[error("P2P network login did not complete, last state: {last_state}")]
    LinkTimeout { last_state: String },
}

impl ConnectionError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Unreachable(_) => "daemon-unreachable",
            Self::Link(_) => "p2p-link-error",
            Self::LinkTimeout { .. } => "p2p-link-timeout",
        }
    }
}

/// Owns the process-side connection state for one daemon.
#[derive(Debug)]
pub struct Connector {
    state: ConnectionState,
    policy: RetryPolicy,
}

impl Connector {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            policy,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Bring the daemon to a searchable state.
    pub async fn connect<D: DaemonApi + ?Sized>(&mut self, daemon: &D) -> Result<(), ConnectionError> {
        info!("Connecting to slskd...");
        self.state = ConnectionState::Connecting;

        match self.establish(daemon).await {
            Ok(()) => {
                self.state = ConnectionState::ConnectedLoggedIn;
                info!("Connected to slskd");
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                error!("slskd connection failed ({}): {}", e.reason(), e);
                Err(e)
            }
        }
    }

    /// Mark the connection closed. The daemon persists, so nothing is sent.
    pub fn disconnect(&mut self) {
        if self.state != ConnectionState::Disconnected {
            self.state = ConnectionState::Disconnected;
            info!("Disconnected from slskd");
        }
    }

    /// Connect and return a guard that disconnects when dropped.
    pub async fn session<'a, D: DaemonApi + ?Sized>(
        &'a mut self,
        daemon: &'a D,
    ) -> Result<Session<'a, D>, ConnectionError> {
        self.connect(daemon).await?;
        Ok(Session {
            connector: self,
            daemon,
        })
    }

    async fn establish<D: DaemonApi + ?Sized>(&self, daemon: &D) -> Result<(), ConnectionError> {
        diagnose(daemon).await;

        if let Err(e) = daemon.authenticate().await {
            warn!("slskd authentication failed: {}", e);
        }

        match daemon.application_state().await {
            Ok(state) => info!("slskd state: {}", state),
            Err(state_err) => {
                warn!("slskd application state unavailable: {}", state_err);
                let version = daemon
                    .application_version()
                    .await
                    .map_err(ConnectionError::Unreachable)?;
                info!("slskd version: {}", version);
            }
        }

        self.ensure_link(daemon).await
    }

    async fn ensure_link<D: DaemonApi + ?Sized>(&self, daemon: &D) -> Result<(), ConnectionError> {
        let initial = daemon.link_state().await.map_err(ConnectionError::Link)?;
        info!("Soulseek link state: {}", initial);

        match initial {
            LinkState::LoggedIn => {
                info!("Already logged into the Soulseek network");
                return Ok(());
            }
            LinkState::Disconnected => {
                info!("Connecting the daemon to the Soulseek network...");
                if let Err(e) = daemon.connect_link().await {
                    warn!("Connect command failed: {}", e);
                }
            }
            LinkState::Transitional(_) => {}
            LinkState::Other(ref s) => warn!("Unexpected Soulseek link state: {}", s),
        }

        let mut last = initial;
        for attempt in 1..=self.policy.max_attempts {
            tokio::time::sleep(self.policy.poll_interval).await;

            let state = match daemon.link_state().await {
                Ok(state) => state,
                Err(e) => {
                    warn!("Attempt {}: link state query failed: {}", attempt, e);
                    continue;
                }
            };
            debug!("Attempt {}: link state = {}", attempt, state);

            match state {
                LinkState::LoggedIn => {
                    info!("Connected and logged into the Soulseek network");
                    return Ok(());
                }
                LinkState::Disconnected if self.policy.should_reconnect(attempt) => {
                    warn!("Still disconnected after {} polls, reissuing connect", attempt);
                    if let Err(e) = daemon.connect_link().await {
                        warn!("Connect command failed: {}", e);
                    }
                }
                LinkState::Other(ref s) => warn!("Unexpected Soulseek link state: {}", s),
                _ => {}
            }
            last = state;
        }

        Err(ConnectionError::LinkTimeout {
            last_state: last.to_string(),
        })
    }
}

/// Log reachability and auth problems; never fails.
async fn diagnose<D: DaemonApi + ?Sized>(daemon: &D) {
    for path in PROBE_PATHS {
        let shown = if path.is_empty() { "/" } else { path };
        match daemon.probe(path).await {
            Ok(probe) => {
                debug!(
                    "Probe {}: status {}, content-type {}, body {}",
                    shown,
                    probe.status,
                    probe.content_type.as_deref().unwrap_or("n/a"),
                    probe.body_preview
                );
                if let Some(issue) = ProbeIssue::classify(probe.status) {
                    warn!("Probe {}: {}", shown, issue.describe());
                }
            }
            Err(DaemonError::Timeout(_)) => warn!("Probe {}: timed out", shown),
            Err(e) => warn!("Probe {} failed: {}", shown, e),
        }
    }
}

/// A connected daemon for the duration of one batch.
pub struct Session<'a, D: ?Sized> {
    connector: &'a mut Connector,
    daemon: &'a D,
}

impl<'a, D: ?Sized> Session<'a, D> {
    pub fn daemon(&self) -> &'a D {
        self.daemon
    }

    pub fn state(&self) -> ConnectionState {
        self.connector.state()
    }
}

impl<D: ?Sized> Drop for Session<'_, D> {
    fn drop(&mut self) {
        self.connector.disconnect();
    }
}
