//! Candidate selection.
//!
//! First-match policy over two quality buckets, in the daemon's own order:
//! - **Preferred**: mp3 with bitrate metadata of exactly 320 kbps. The first
//!   one seen wins and stops the scan.
//! - **Fallback**: flac. The first one seen is used only if no preferred
//!   result exists.
//!
//! Each result is classified by its first file. Results with no files, an
//! extension outside the accepted formats, or a first file failing the
//! minimum quality guard are skipped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::config::DownloadConfig;
use crate::model::TrackDescriptor;
use crate::slskd::{CandidateFile, CandidateResult};

pub const PREFERRED_FORMAT: &str = "mp3";
pub const PREFERRED_BITRATE_KBPS: u32 = 320;
pub const FALLBACK_FORMAT: &str = "flac";

/// `128kbps`, `96 kbps`, `320KBPS`...
static ADVERTISED_BITRATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{2,4})\s*kbps").expect("valid bitrate pattern"));

/// Which bucket a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityBucket {
    Preferred,
    Fallback,
}

/// The chosen result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: CandidateResult,
    pub bucket: QualityBucket,
}

/// Filter settings
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// Lower-case extensions that may be selected at all
    pub audio_formats: Vec<String>,
    /// Filenames advertising a lower `<N>kbps` are rejected
    pub min_bitrate: u32,
    /// Files smaller than this are rejected
    pub min_file_size: u64,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self::from(&DownloadConfig::default())
    }
}

impl From<&DownloadConfig> for RankerConfig {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            audio_formats: config.audio_formats.iter().map(|f| f.to_lowercase()).collect(),
            min_bitrate: config.min_bitrate,
            min_file_size: config.min_file_size_bytes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ranker {
    config: RankerConfig,
}

impl Ranker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// Pick a result for `track`, or `None` when nothing qualifies.
    pub fn select(&self, track: &TrackDescriptor, candidates: Vec<CandidateResult>) -> Option<Selection> {
        let total = candidates.len();
        let mut fallback = None;

        for candidate in candidates {
            let Some(first) = candidate.first_file() else {
                continue;
            };
            if !self.accepts(first) {
                continue;
            }

            match first.container_ext.as_str() {
                PREFERRED_FORMAT if first.bitrate_kbps == Some(PREFERRED_BITRATE_KBPS) => {
                    debug!("{}: preferred match from {}: {}", track, candidate.owner, first.filename);
                    return Some(Selection {
                        candidate,
                        bucket: QualityBucket::Preferred,
                    });
                }
                FALLBACK_FORMAT if fallback.is_none() => fallback = Some(candidate),
                _ => {}
            }
        }

        match fallback {
            Some(candidate) => {
                debug!("{}: falling back to flac from {}", track, candidate.owner);
                Some(Selection {
                    candidate,
                    bucket: QualityBucket::Fallback,
                })
            }
            None => {
                debug!("{}: no acceptable candidate among {} results", track, total);
                None
            }
        }
    }

    /// Format and minimum quality guard for the classifying file.
    fn accepts(&self, file: &CandidateFile) -> bool {
        if !self.config.audio_formats.iter().any(|f| *f == file.container_ext) {
            return false;
        }
        if file.size_bytes < self.config.min_file_size {
            return false;
        }
        !advertises_low_bitrate(&file.filename, self.config.min_bitrate)
    }
}

fn advertises_low_bitrate(filename: &str, min_bitrate: u32) -> bool {
    ADVERTISED_BITRATE
        .captures_iter(filename)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .any(|kbps| kbps < min_bitrate)
}
