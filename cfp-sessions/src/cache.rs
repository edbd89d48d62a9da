//! Session cache
//!
//! Lazily populated, process-wide store of normalized sessions.
//!
//! # Lifecycle
//! - **Uninitialized** until the first read.
//! - The first read loads the snapshot, or, when there is none (or it does
//!   not parse), generates it by fetching every category concurrently and
//!   persisting the result.
//! - **Ready**: the in-memory map answers all bulk reads for the rest of the
//!   process. It is never refreshed.
//! - **Degraded**: neither the snapshot nor generation produced data. Single
//!   lookups go straight to the source; bulk reads return nothing.
//!
//! Initialization runs at most once. Concurrent first readers all await the
//! same in-flight initialization.

use crate::client::SourceError;
use crate::fetcher::SessionSource;
use crate::snapshot::{SessionMap, SnapshotStore};
use crate::types::{SubmissionCategory, Talk};
use futures::future::try_join_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Reasons the cache could not be populated
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("API token not configured, cannot generate session snapshot")]
    MissingCredential,

    #[error("Remote fetch failed: {0}")]
    Source(#[from] SourceError),
}

/// Observable lifecycle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Ready { sessions: usize },
    Degraded { reason: String },
}

enum Contents {
    Ready(SessionMap),
    Degraded(String),
}

pub struct SessionCache {
    source: Arc<dyn SessionSource>,
    snapshot: SnapshotStore,
    contents: OnceCell<Contents>,
}

impl SessionCache {
    pub fn new(source: Arc<dyn SessionSource>, snapshot: SnapshotStore) -> Self {
        Self {
            source,
            snapshot,
            contents: OnceCell::new(),
        }
    }

    pub fn state(&self) -> CacheState {
        match self.contents.get() {
            None => CacheState::Uninitialized,
            Some(Contents::Ready(map)) => CacheState::Ready {
                sessions: map.len(),
            },
            Some(Contents::Degraded(reason)) => CacheState::Degraded {
                reason: reason.clone(),
            },
        }
    }

    /// Populate the cache if needed and report the resulting state
    pub async fn warm(&self) -> CacheState {
        self.contents().await;
        self.state()
    }

    /// Session with `code`
    ///
    /// Served from memory when cached. Otherwise the source is asked directly;
    /// a failure there is logged and reported as `None`.
    pub async fn get_session(&self, code: &str) -> Option<Talk> {
        if let Contents::Ready(map) = self.contents().await {
            if let Some(talk) = map.get(code) {
                return Some(talk.clone());
            }
        }

        debug!(code = %code, "Session not cached, fetching directly");
        match self.source.fetch_by_code(code).await {
            Ok(talk) => talk,
            Err(e) => {
                warn!(code = %code, error = %e, "Direct session fetch failed");
                None
            }
        }
    }

    /// Every cached session in category then source order; empty when degraded
    pub async fn get_all_sessions(&self) -> Vec<Talk> {
        match self.contents().await {
            Contents::Ready(map) => map.values().cloned().collect(),
            Contents::Degraded(_) => Vec::new(),
        }
    }

    /// Cached sessions of `category` in source order; empty when degraded
    pub async fn get_sessions_by_category(&self, category: SubmissionCategory) -> Vec<Talk> {
        match self.contents().await {
            Contents::Ready(map) => map
                .values()
                .filter(|t| t.submission_type_id == category.id())
                .cloned()
                .collect(),
            Contents::Degraded(_) => Vec::new(),
        }
    }

    async fn contents(&self) -> &Contents {
        self.contents.get_or_init(|| self.initialize()).await
    }

    async fn initialize(&self) -> Contents {
        match self.snapshot.load().await {
            Ok(Some(map)) => return Contents::Ready(map),
            Ok(None) => info!("No session snapshot, generating from remote source"),
            Err(e) => warn!(
                path = %self.snapshot.path().display(),
                error = %e,
                "Session snapshot unreadable, regenerating"
            ),
        }

        let map = match self.generate().await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Session cache degraded to per-call fetching");
                return Contents::Degraded(e.to_string());
            }
        };

        if let Err(e) = self.snapshot.save(&map).await {
            warn!(
                path = %self.snapshot.path().display(),
                error = %e,
                "Could not persist session snapshot, keeping it in memory only"
            );
        }

        Contents::Ready(map)
    }

    async fn generate(&self) -> Result<SessionMap, CacheError> {
        if !self.source.is_configured() {
            return Err(CacheError::MissingCredential);
        }

        let batches = try_join_all(
            SubmissionCategory::ALL
                .iter()
                .map(|category| self.source.fetch_by_category(*category)),
        )
        .await?;

        // Categories concatenated in `ALL` order; a repeated code keeps its
        // first position and takes the later record
        let mut map = SessionMap::new();
        for talk in batches.into_iter().flatten() {
            if let Some(previous) = map.insert(talk.code.clone(), talk) {
                warn!(code = %previous.code, "Duplicate session code across categories");
            }
        }

        info!(sessions = map.len(), "Generated session snapshot");
        Ok(map)
    }
}
