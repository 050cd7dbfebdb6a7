//! On-disk format for corpus statistics
//!
//! ```text
//! +--------+-----------+---------------------------+
//! | "RCST" | u32 LE    | MessagePack payload       |
//! | magic  | version   | (CorpusStatistics)        |
//! +--------+-----------+---------------------------+
//! ```
//!
//! Writes go through write-fsync-rename so a crash never leaves a torn file
//! in place. Reads never fail: anything unreadable degrades to
//! [`CorpusStatistics::empty`], which callers treat the same as a cold start.

use crate::stats::CorpusStatistics;
use recall_core::{RecallError, RecallResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Magic bytes identifying a statistics file
pub const STATS_MAGIC: &[u8; 4] = b"RCST";

/// Current format version
pub const STATS_FORMAT_VERSION: u32 = 1;

const HEADER_SIZE: usize = 8;

/// Reasons a statistics file could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum StatsFileError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File shorter than the header
    #[error("file too short: {0} bytes")]
    TooShort(usize),

    /// Magic bytes did not match
    #[error("invalid magic bytes")]
    InvalidMagic,

    /// Written by a newer or unknown format version
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    /// Payload failed to encode or decode
    #[error("payload codec error: {0}")]
    Codec(String),

    /// Payload decoded but violates the statistics invariants
    #[error("statistics fail consistency check")]
    Inconsistent,
}

impl From<StatsFileError> for RecallError {
    fn from(e: StatsFileError) -> Self {
        RecallError::Persistence(e.to_string())
    }
}

/// Serialize statistics to the file format.
pub fn to_bytes(stats: &CorpusStatistics) -> Result<Vec<u8>, StatsFileError> {
    let payload = rmp_serde::to_vec(stats).map_err(|e| StatsFileError::Codec(e.to_string()))?;
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(STATS_MAGIC);
    buf.extend_from_slice(&STATS_FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Deserialize statistics, validating magic, version and invariants.
pub fn from_bytes(data: &[u8]) -> Result<CorpusStatistics, StatsFileError> {
    if data.len() < HEADER_SIZE {
        return Err(StatsFileError::TooShort(data.len()));
    }
    if &data[0..4] != STATS_MAGIC {
        return Err(StatsFileError::InvalidMagic);
    }
    let mut version_bytes = [0u8; 4];
    version_bytes.copy_from_slice(&data[4..8]);
    let version = u32::from_le_bytes(version_bytes);
    if version != STATS_FORMAT_VERSION {
        return Err(StatsFileError::UnsupportedVersion(version));
    }

    let stats: CorpusStatistics = rmp_serde::from_slice(&data[HEADER_SIZE..])
        .map_err(|e| StatsFileError::Codec(e.to_string()))?;
    if !stats.is_consistent() {
        return Err(StatsFileError::Inconsistent);
    }
    Ok(stats)
}

/// Persist statistics to `path` atomically.
pub fn save(stats: &CorpusStatistics, path: &Path) -> RecallResult<()> {
    let bytes = to_bytes(stats)?;
    let temp_path = path.with_extension("tmp");

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)?;

    if let Some(parent) = path.parent() {
        if parent.exists() && !parent.as_os_str().is_empty() {
            let dir_fd = File::open(parent)?;
            // Directory fsync is not supported everywhere; the rename already landed.
            let _ = dir_fd.sync_all();
        }
    }

    tracing::debug!(
        target: "recall::stats",
        path = %path.display(),
        bytes = bytes.len(),
        total_documents = stats.total_documents(),
        "Saved corpus statistics"
    );
    Ok(())
}

/// Read statistics from `path`, returning `None` if the file is absent.
pub fn try_load(path: &Path) -> Result<Option<CorpusStatistics>, StatsFileError> {
    match std::fs::read(path) {
        Ok(data) => from_bytes(&data).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StatsFileError::Io(e)),
    }
}

/// Load statistics from `path`.
///
/// A missing, truncated, foreign or corrupt file yields
/// [`CorpusStatistics::empty`]; the reason is logged at `warn`.
pub fn load(path: &Path) -> CorpusStatistics {
    match try_load(path) {
        Ok(Some(stats)) => {
            tracing::debug!(
                target: "recall::stats",
                path = %path.display(),
                total_documents = stats.total_documents(),
                "Loaded corpus statistics"
            );
            stats
        }
        Ok(None) => {
            tracing::warn!(
                target: "recall::stats",
                path = %path.display(),
                "No statistics file; starting with empty statistics"
            );
            CorpusStatistics::empty()
        }
        Err(e) => {
            tracing::warn!(
                target: "recall::stats",
                path = %path.display(),
                error = %e,
                "Unreadable statistics file; starting with empty statistics"
            );
            CorpusStatistics::empty()
        }
    }
}
