//! Batch resolution with bounded fan-out.
//!
//! Every track runs format → search → rank → submit as its own unit. Units
//! interleave on the caller's task via `join_all`; a [`Semaphore`] is the
//! admission gate that keeps at most `max_concurrent` of them talking to the
//! daemon at once. A failing unit only produces a failed outcome.

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::connector::{ConnectionError, Connector, RetryPolicy};
use super::query;
use super::ranker::{Ranker, RankerConfig, Selection};
use super::search::SearchPoller;
use super::submit::submit;
use crate::config::Config;
use crate::model::{BatchSummary, DownloadOutcome, EnqueuedDownload, TrackDescriptor, TrackError};
use crate::slskd::DaemonApi;

/// Owns the daemon handle and everything a batch needs.
pub struct Resolver<D> {
    daemon: D,
    connector: Connector,
    poller: SearchPoller,
    ranker: Ranker,
    max_concurrent: usize,
}

impl<D: DaemonApi> Resolver<D> {
    pub fn new(
        daemon: D,
        connector: Connector,
        poller: SearchPoller,
        ranker: Ranker,
        max_concurrent: usize,
    ) -> Self {
        Self {
            daemon,
            connector,
            poller,
            ranker,
            max_concurrent: max_concurrent.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    pub fn from_config(daemon: D, config: &Config) -> Self {
        Self::new(
            daemon,
            Connector::new(RetryPolicy::from_config(&config.daemon)),
            SearchPoller::from_config(&config.download),
            Ranker::new(RankerConfig::from(&config.download)),
            config.download.max_concurrent,
        )
    }

    pub fn daemon(&self) -> &D {
        &self.daemon
    }

    /// Resolve and enqueue every track.
    ///
    /// Returns exactly one outcome per input track, in input order. Only a
    /// failed connect aborts the batch.
    pub async fn download_all(
        &mut self,
        tracks: &[TrackDescriptor],
    ) -> Result<Vec<DownloadOutcome>, ConnectionError> {
        let session = self.connector.session(&self.daemon).await?;
        let gate = Semaphore::new(self.max_concurrent);
        let (poller, ranker) = (&self.poller, &self.ranker);
        let total = tracks.len();
        info!("Processing {} tracks, {} at a time", total, self.max_concurrent);

        let units = tracks.iter().enumerate().map(|(index, track)| {
            process_track(session.daemon(), &gate, poller, ranker, track, index + 1, total)
        });
        let outcomes = join_all(units).await;
        drop(session);

        info!("Batch finished: {} enqueued", BatchSummary::from_outcomes(&outcomes));
        Ok(outcomes)
    }

    /// Search and rank a single track without enqueueing anything.
    pub async fn resolve_one(
        &mut self,
        track: &TrackDescriptor,
    ) -> Result<Result<Selection, TrackError>, ConnectionError> {
        let session = self.connector.session(&self.daemon).await?;
        Ok(find_candidate(session.daemon(), &self.poller, &self.ranker, track).await)
    }
}

async fn process_track<D: DaemonApi + ?Sized>(
    daemon: &D,
    gate: &Semaphore,
    poller: &SearchPoller,
    ranker: &Ranker,
    track: &TrackDescriptor,
    position: usize,
    total: usize,
) -> DownloadOutcome {
    let Ok(_permit) = gate.acquire().await else {
        return DownloadOutcome::failure(track.clone(), TrackError::Aborted);
    };
    info!("[{}/{}] {}", position, total, track);

    match resolve_and_submit(daemon, poller, ranker, track).await {
        Ok(enqueued) => DownloadOutcome::success(track.clone(), enqueued),
        Err(e) => {
            warn!("[{}/{}] {}: {} ({})", position, total, track, e, e.reason());
            DownloadOutcome::failure(track.clone(), e)
        }
    }
}

async fn resolve_and_submit<D: DaemonApi + ?Sized>(
    daemon: &D,
    poller: &SearchPoller,
    ranker: &Ranker,
    track: &TrackDescriptor,
) -> Result<EnqueuedDownload, TrackError> {
    let selection = find_candidate(daemon, poller, ranker, track).await?;
    Ok(submit(daemon, &selection.candidate).await?)
}

async fn find_candidate<D: DaemonApi + ?Sized>(
    daemon: &D,
    poller: &SearchPoller,
    ranker: &Ranker,
    track: &TrackDescriptor,
) -> Result<Selection, TrackError> {
    let query = query::format(track);
    let candidates = poller.search(daemon, &query).await?;
    if candidates.is_empty() {
        return Err(TrackError::NoResults);
    }

    let count = candidates.len();
    ranker
        .select(track, candidates)
        .ok_or(TrackError::NoMatch(count))
}
