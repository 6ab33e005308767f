//! Test utilities and fixtures.
//!
//! Builders for tracks and peer results so resolver tests read as data.
//! Default file sizes clear the minimum quality guard.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{mp3_result, track};
//!
//! let mock = MockDaemon::logged_in()
//!     .with_responses("Artist Title", vec![mp3_result("peer", "t.mp3", Some(320))]);
//! ```

use crate::model::TrackDescriptor;
use crate::slskd::adapter::extension_of;
use crate::slskd::{CandidateFile, CandidateResult};

pub const MB: u64 = 1024 * 1024;

/// A track with just artist and title.
pub fn track(artist: &str, title: &str) -> TrackDescriptor {
    TrackDescriptor::new(artist, title)
}

/// A fully populated track.
pub fn mock_track() -> TrackDescriptor {
    TrackDescriptor::new("Test Artist", "Test Title")
        .with_album("Test Album")
        .with_duration_ms(180_000)
}

/// One shared file; the extension is taken from `filename`.
pub fn file(username: &str, filename: &str, size_bytes: u64, bitrate_kbps: Option<u32>) -> CandidateFile {
    CandidateFile {
        username: username.to_string(),
        filename: filename.to_string(),
        size_bytes,
        bitrate_kbps,
        container_ext: extension_of(filename),
    }
}

/// A peer result built from `(filename, size, bitrate)` tuples.
pub fn candidate(owner: &str, files: Vec<(&str, u64, Option<u32>)>) -> CandidateResult {
    CandidateResult {
        owner: owner.to_string(),
        files: files
            .into_iter()
            .map(|(name, size, bitrate)| file(owner, name, size, bitrate))
            .collect(),
    }
}

/// A single-file mp3 result of about 8 MB.
pub fn mp3_result(owner: &str, filename: &str, bitrate_kbps: Option<u32>) -> CandidateResult {
    candidate(owner, vec![(filename, 8 * MB, bitrate_kbps)])
}

/// A single-file flac result of about 30 MB, without bitrate metadata.
pub fn flac_result(owner: &str, filename: &str) -> CandidateResult {
    candidate(owner, vec![(filename, 30 * MB, None)])
}
