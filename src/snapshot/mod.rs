//! Snapshot persistence for the store state.
//!
//! A snapshot directory holds two files:
//!
//! - `state.json` — the full store state as JSON
//! - `manifest.json` — creation time and a CRC32 checksum of the state file
//!
//! The state file is written before the manifest, so a manifest always
//! describes a complete state file. Loading verifies the checksum and
//! refuses corrupted or unparsable snapshots.

pub mod errors;

pub use errors::{SnapshotError, SnapshotResult};

use chrono::{DateTime, Utc};
use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::store::state::StoreState;

/// State file name inside a snapshot directory
pub const STATE_FILE: &str = "state.json";
/// Manifest file name inside a snapshot directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Snapshot manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    /// When the snapshot was written
    pub created_at: DateTime<Utc>,
    /// Checksum of the state file, `crc32:` prefixed lowercase hex
    pub state_checksum: String,
}

/// Compute a CRC32 checksum; deterministic for identical input
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Format a checksum as `crc32:XXXXXXXX` (lowercase hex, zero-padded)
pub fn format_checksum(checksum: u32) -> String {
    format!("crc32:{:08x}", checksum)
}

/// Parse a `crc32:`-formatted checksum back to its value
pub fn parse_checksum(formatted: &str) -> Option<u32> {
    let hex = formatted.strip_prefix("crc32:")?;
    u32::from_str_radix(hex, 16).ok()
}

/// Write `state` into `dir`, creating the directory if needed
pub fn write(state: &StoreState, dir: &Path) -> SnapshotResult<SnapshotManifest> {
    fs::create_dir_all(dir).map_err(|e| SnapshotError::io(dir, e))?;

    let state_bytes = serde_json::to_vec_pretty(state)
        .map_err(|e| SnapshotError::Malformed(format!("state serialization failed: {e}")))?;
    let manifest = SnapshotManifest {
        created_at: Utc::now(),
        state_checksum: format_checksum(compute_checksum(&state_bytes)),
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| SnapshotError::Malformed(format!("manifest serialization failed: {e}")))?;

    let state_path = dir.join(STATE_FILE);
    fs::write(&state_path, &state_bytes).map_err(|e| SnapshotError::io(&state_path, e))?;
    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes).map_err(|e| SnapshotError::io(&manifest_path, e))?;

    Ok(manifest)
}

/// Read a snapshot back from `dir`, verifying the state checksum
pub fn read(dir: &Path) -> SnapshotResult<StoreState> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest_bytes =
        fs::read(&manifest_path).map_err(|e| SnapshotError::io(&manifest_path, e))?;
    let manifest: SnapshotManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| SnapshotError::Malformed(format!("manifest parse failed: {e}")))?;

    let expected = parse_checksum(&manifest.state_checksum).ok_or_else(|| {
        SnapshotError::Malformed(format!(
            "unrecognized checksum format '{}'",
            manifest.state_checksum
        ))
    })?;

    let state_path = dir.join(STATE_FILE);
    let state_bytes = fs::read(&state_path).map_err(|e| SnapshotError::io(&state_path, e))?;
    let actual = compute_checksum(&state_bytes);
    if actual != expected {
        return Err(SnapshotError::ChecksumMismatch {
            expected: manifest.state_checksum,
            actual: format_checksum(actual),
        });
    }

    serde_json::from_slice(&state_bytes)
        .map_err(|e| SnapshotError::Malformed(format!("state parse failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConsumerSite, Playlist};
    use tempfile::TempDir;

    fn sample_state() -> StoreState {
        let mut state = StoreState::default();
        let site = ConsumerSite::new("Site", "site.example.com");
        let site_id = site.meta.id;
        state.consumer_sites.insert(site_id, site);
        let playlist = Playlist::new("Maths", "lti-maths", site_id);
        state.playlists.insert(playlist.meta.id, playlist);
        state
    }

    #[test]
    fn test_checksum_format_roundtrip() {
        assert_eq!(format_checksum(0xDEADBEEF), "crc32:deadbeef");
        assert_eq!(parse_checksum("crc32:deadbeef"), Some(0xDEADBEEF));
        assert_eq!(parse_checksum("md5:deadbeef"), None);
        assert_eq!(parse_checksum("crc32:zz"), None);
    }

    #[test]
    fn test_write_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let state = sample_state();
        write(&state, tmp.path()).unwrap();
        let reloaded = read(tmp.path()).unwrap();
        assert_eq!(reloaded, state);
    }

    #[test]
    fn test_corrupted_state_detected() {
        let tmp = TempDir::new().unwrap();
        write(&sample_state(), tmp.path()).unwrap();

        let state_path = tmp.path().join(STATE_FILE);
        let mut bytes = fs::read(&state_path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        fs::write(&state_path, &bytes).unwrap();

        assert!(matches!(
            read(tmp.path()),
            Err(SnapshotError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_manifest() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(read(tmp.path()), Err(SnapshotError::Io { .. })));
    }
}
