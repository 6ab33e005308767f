//! Trait definition for the daemon control API.
//!
//! The resolver only ever talks to [`DaemonApi`], so tests can substitute
//! [`mocks::MockDaemon`] for the real HTTP client.

use async_trait::async_trait;

use super::client::SlskdClient;
use super::domain::{
    CandidateFile, CandidateResult, DaemonError, LinkState, ProbeResponse, SearchJob, SearchState,
};

/// Operations the resolver needs from the daemon.
#[async_trait]
pub trait DaemonApi: Send + Sync {
    /// Diagnostic GET relative to the base URL.
    async fn probe(&self, path: &str) -> Result<ProbeResponse, DaemonError>;

    /// Establish API credentials (session token) if required.
    async fn authenticate(&self) -> Result<(), DaemonError>;

    /// Human-readable application state.
    async fn application_state(&self) -> Result<String, DaemonError>;

    async fn application_version(&self) -> Result<String, DaemonError>;

    /// The daemon's P2P network link.
    async fn link_state(&self) -> Result<LinkState, DaemonError>;

    /// Ask the daemon to connect its P2P link.
    async fn connect_link(&self) -> Result<(), DaemonError>;

    async fn start_search(&self, query: &str) -> Result<SearchJob, DaemonError>;

    async fn search_state(&self, id: &str) -> Result<SearchState, DaemonError>;

    async fn search_responses(&self, id: &str) -> Result<Vec<CandidateResult>, DaemonError>;

    /// Queue every file under one peer's identity.
    async fn enqueue(&self, username: &str, files: &[CandidateFile]) -> Result<(), DaemonError>;
}

#[async_trait]
impl DaemonApi for SlskdClient {
    async fn probe(&self, path: &str) -> Result<ProbeResponse, DaemonError> {
        self.probe(path).await
    }

    async fn authenticate(&self) -> Result<(), DaemonError> {
        self.authenticate().await
    }

    async fn application_state(&self) -> Result<String, DaemonError> {
        self.application_state().await
    }

    async fn application_version(&self) -> Result<String, DaemonError> {
        self.application_version().await
    }

    async fn link_state(&self) -> Result<LinkState, DaemonError> {
        self.link_state().await
    }

    async fn connect_link(&self) -> Result<(), DaemonError> {
        self.connect_link().await
    }

    async fn start_search(&self, query: &str) -> Result<SearchJob, DaemonError> {
        self.start_search(query).await
    }

    async fn search_state(&self, id: &str) -> Result<SearchState, DaemonError> {
        self.search_state(id).await
    }

    async fn search_responses(&self, id: &str) -> Result<Vec<CandidateResult>, DaemonError> {
        self.search_responses(id).await
    }

    async fn enqueue(&self, username: &str, files: &[CandidateFile]) -> Result<(), DaemonError> {
        self.enqueue(username, files).await
    }
}
