//! On-disk artifact store — a flat directory of MP3 files.
//!
//! All displayed metadata is derived live from filesystem attributes; there
//! is no index file and no sidecar state. The directory is the only shared
//! mutable resource in the system: concurrent writes to the same name race
//! last-writer-wins, and listings are best-effort snapshots.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::debug;

use murmur_core::types::AudioArtifact;

use crate::error::AppError;

const EXTENSION: &str = "mp3";

/// Flat directory of `.mp3` artifacts. Constructed with an explicit path —
/// there is no ambient global store location.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating the directory if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List artifacts, most recently modified first.
    ///
    /// Best-effort snapshot: entries that vanish or fail to stat mid-scan are
    /// skipped, and an unreadable directory yields an empty list. No locking.
    pub fn list(&self) -> Vec<AudioArtifact> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("store: cannot read {}: {e}", self.dir.display());
                return Vec::new();
            }
        };

        let mut files: Vec<(SystemTime, AudioArtifact)> = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((
                modified,
                AudioArtifact {
                    name: name.to_string(),
                    size_kb: round_kb(meta.len()),
                    created: format_timestamp(modified),
                },
            ));
        }

        files.sort_by(|a, b| b.0.cmp(&a.0));
        files.into_iter().map(|(_, artifact)| artifact).collect()
    }

    /// Write a complete audio buffer as `<dir>/<token>.mp3`, silently
    /// overwriting any existing file of the same name. Returns the stored
    /// file name.
    ///
    /// This is a single `fs::write` with no temp-file staging, so a crash
    /// mid-write can leave a truncated artifact.
    pub fn write(&self, token: &str, bytes: &[u8]) -> io::Result<String> {
        let file_name = format!("{token}.{EXTENSION}");
        fs::write(self.dir.join(&file_name), bytes)?;
        Ok(file_name)
    }

    /// Resolve an untrusted file name to a path inside the store directory.
    ///
    /// Only a single normal path component is accepted; `..`, separators and
    /// absolute paths are rejected before the filesystem is touched.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, AppError> {
        let mut components = Path::new(requested).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.dir.join(requested)),
            _ => Err(AppError::PathTraversal),
        }
    }
}

fn round_kb(len: u64) -> f64 {
    (len as f64 / 1024.0 * 10.0).round() / 10.0
}

fn format_timestamp(t: SystemTime) -> String {
    DateTime::<Local>::from(t)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
