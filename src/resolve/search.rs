//! Search job submission and polling.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::DownloadConfig;
use crate::slskd::{CandidateResult, DaemonApi, DaemonError, SearchState};

/// Errors while running a search job
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search submission failed: {0}")]
    Submit(#[source] DaemonError),

    #[error("polling search {id} failed: {source}")]
    Poll {
        id: String,
        #[source]
        source: DaemonError,
    },

    #[error("fetching responses for search {id} failed: {source}")]
    Fetch {
        id: String,
        #[source]
        source: DaemonError,
    },

    #[error("search {id} errored on the daemon")]
    JobErrored { id: String },

    #[error("search for {query:?} still running after {waited:?}")]
    Timeout { query: String, waited: Duration },
}

impl SearchError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Submit(_) => "search-submit-failed",
            Self::Poll { .. } => "search-poll-failed",
            Self::Fetch { .. } => "search-fetch-failed",
            Self::JobErrored { .. } => "search-errored",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Submits a search and waits for it to finish.
#[derive(Debug, Clone, Copy)]
pub struct SearchPoller {
    poll_interval: Duration,
    timeout: Duration,
}

impl Default for SearchPoller {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        }
    }
}

impl SearchPoller {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn from_config(config: &DownloadConfig) -> Self {
        Self::new(
            Duration::from_millis(config.search_poll_interval_ms),
            Duration::from_secs(config.search_timeout_secs),
        )
    }

    /// Run one search to completion and return every peer response.
    ///
    /// Zero responses is a successful, empty result. A daemon-side
    /// `TimedOut` search is complete; its responses are still fetched.
    /// The whole exchange, including a daemon request that never answers,
    /// is bounded by the poller's timeout.
    pub async fn search<D: DaemonApi + ?Sized>(
        &self,
        daemon: &D,
        query: &str,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        let deadline = Instant::now() + self.timeout;
        match tokio::time::timeout_at(deadline, self.run(daemon, query, deadline)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Search for {:?} stalled past {:?}", query, self.timeout);
                Err(self.timed_out(query))
            }
        }
    }

    async fn run<D: DaemonApi + ?Sized>(
        &self,
        daemon: &D,
        query: &str,
        deadline: Instant,
    ) -> Result<Vec<CandidateResult>, SearchError> {
        let job = daemon.start_search(query).await.map_err(SearchError::Submit)?;
        debug!("Search {} submitted: {:?}", job.id, query);

        loop {
            let state = daemon
                .search_state(&job.id)
                .await
                .map_err(|source| SearchError::Poll {
                    id: job.id.clone(),
                    source,
                })?;
            debug!("Search {} state: {:?}", job.id, state);

            if state == SearchState::Errored {
                return Err(SearchError::JobErrored { id: job.id });
            }
            if state.is_terminal() {
                break;
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out(query));
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }

        let responses = daemon
            .search_responses(&job.id)
            .await
            .map_err(|source| SearchError::Fetch {
                id: job.id.clone(),
                source,
            })?;
        debug!("Search {} returned {} responses", job.id, responses.len());
        Ok(responses)
    }

    fn timed_out(&self, query: &str) -> SearchError {
        SearchError::Timeout {
            query: query.to_string(),
            waited: self.timeout,
        }
    }
}
