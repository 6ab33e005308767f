//! Adapter layer: Convert slskd DTOs to domain models
//!
//! This is the ONLY place where slskd DTO types are converted to domain types.

use super::domain::{CandidateFile, CandidateResult, LinkState, SearchJob, SearchState};
use super::dto;

/// Convert a search as returned by the daemon.
pub fn to_search_job(search: dto::Search) -> SearchJob {
    let state = if search.state.is_empty() && search.is_complete {
        SearchState::Completed
    } else {
        SearchState::from_flags(&search.state)
    };
    SearchJob {
        id: search.id,
        state,
    }
}

/// Convert the P2P link state, trusting the boolean flags over the text.
pub fn to_link_state(server: &dto::ServerState) -> LinkState {
    if server.is_connected && server.is_logged_in {
        LinkState::LoggedIn
    } else {
        LinkState::from_flags(&server.state)
    }
}

/// Convert search responses, keeping the daemon's order.
pub fn to_candidates(responses: Vec<dto::SearchResponse>) -> Vec<CandidateResult> {
    responses.into_iter().map(to_candidate).collect()
}

fn to_candidate(response: dto::SearchResponse) -> CandidateResult {
    let owner = response.username;
    let files = response
        .files
        .into_iter()
        .map(|file| to_candidate_file(&owner, file))
        .collect();
    CandidateResult { owner, files }
}

fn to_candidate_file(owner: &str, file: dto::SearchFile) -> CandidateFile {
    let container_ext = file
        .extension
        .as_deref()
        .map(|e| e.trim().trim_start_matches('.'))
        .filter(|e| !e.is_empty())
        .map(str::to_lowercase)
        .unwrap_or_else(|| extension_of(&file.filename));

    CandidateFile {
        username: owner.to_string(),
        filename: file.filename,
        size_bytes: file.size,
        bitrate_kbps: file.bit_rate,
        container_ext,
    }
}

/// Lower-case extension of a remote path; peers use either separator.
pub fn extension_of(filename: &str) -> String {
    let name = filename.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(filename);
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() => name[pos + 1..].to_lowercase(),
        _ => String::new(),
    }
}

/// Build the enqueue body from domain files.
pub fn to_queued_files(files: &[CandidateFile]) -> Vec<dto::QueuedFile> {
    files
        .iter()
        .map(|f| dto::QueuedFile {
            filename: f.filename.clone(),
            size: f.size_bytes,
        })
        .collect()
}

/// One-line summary of `GET /application` for logs.
pub fn describe_application(state: &dto::ApplicationState) -> String {
    let version = state
        .version
        .as_ref()
        .and_then(|v| v.current.clone().or_else(|| v.full.clone()))
        .unwrap_or_else(|| "unknown".to_string());
    let server = state
        .server
        .as_ref()
        .map(|s| s.state.clone())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    format!("version {version}, server {server}")
}
