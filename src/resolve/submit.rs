//! Hand a selected result to the daemon's download queue.

use tracing::info;

use crate::model::EnqueuedDownload;
use crate::slskd::{CandidateResult, DaemonApi, DaemonError};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Owner or first filename missing; nothing was sent
    #[error("candidate is missing its owner or filename")]
    IncompleteFileInfo,

    #[error("daemon rejected download from {username}: {source}")]
    Rejected {
        username: String,
        #[source]
        source: DaemonError,
    },
}

impl DownloadError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::IncompleteFileInfo => "incomplete-file-info",
            Self::Rejected { .. } => "download-rejected",
        }
    }
}

/// Enqueue every file of `candidate` under its owner's identity.
///
/// Success means the daemon accepted the request, not that the transfer
/// finished.
pub async fn submit<D: DaemonApi + ?Sized>(
    daemon: &D,
    candidate: &CandidateResult,
) -> Result<EnqueuedDownload, DownloadError> {
    let username = candidate.owner.trim();
    let filename = match candidate.first_file() {
        Some(file) if !file.filename.is_empty() => file.filename.clone(),
        _ => return Err(DownloadError::IncompleteFileInfo),
    };
    if username.is_empty() {
        return Err(DownloadError::IncompleteFileInfo);
    }

    daemon
        .enqueue(username, &candidate.files)
        .await
        .map_err(|source| DownloadError::Rejected {
            username: username.to_string(),
            source,
        })?;

    info!("Queued {} from {}", filename, username);
    Ok(EnqueuedDownload {
        username: username.to_string(),
        filename,
        file_count: candidate.files.len(),
    })
}
