//! Persisted session snapshot
//!
//! A single pretty-printed JSON object mapping session code → [`Talk`],
//! stored as `sessions.json` in the data directory. Entries keep the order
//! they were inserted in, on disk and after loading.

use crate::types::Talk;
use indexmap::IndexMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// File name of the snapshot inside the data directory
pub const SNAPSHOT_FILE_NAME: &str = "sessions.json";

/// Sessions keyed by code, in source order
pub type SessionMap = IndexMap<String, Talk>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Snapshot is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Snapshot write failed: {0}")]
    Write(#[from] cfp_common::Error),
}

/// Location and format of the snapshot file
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Snapshot stored as [`SNAPSHOT_FILE_NAME`] under `data_dir`
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SNAPSHOT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot
    ///
    /// Returns `Ok(None)` when no snapshot file exists.
    pub async fn load(&self) -> Result<Option<SessionMap>, SnapshotError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot on disk");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let sessions: SessionMap = serde_json::from_slice(&bytes)?;
        info!(
            path = %self.path.display(),
            sessions = sessions.len(),
            "Loaded session snapshot"
        );
        Ok(Some(sessions))
    }

    /// Write the snapshot atomically, creating the data directory on demand
    pub async fn save(&self, sessions: &SessionMap) -> Result<(), SnapshotError> {
        let bytes = serde_json::to_vec_pretty(sessions)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || cfp_common::config::write_atomic(&path, &bytes, false))
            .await
            .map_err(|e| SnapshotError::Io(io::Error::new(io::ErrorKind::Other, e)))??;

        info!(
            path = %self.path.display(),
            sessions = sessions.len(),
            "Wrote session snapshot"
        );
        Ok(())
    }
}
