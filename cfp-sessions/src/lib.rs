//! cfp-sessions library interface
//!
//! Conference session acquisition and caching:
//! - [`client`]: remote CFP platform HTTP client
//! - [`normalizer`]: raw submission → [`types::Talk`]
//! - [`fetcher`]: paginated retrieval behind the [`fetcher::SessionSource`] trait
//! - [`snapshot`]: persisted session map
//! - [`cache`]: single-flight, snapshot-backed session cache

pub mod cache;
pub mod client;
pub mod config;
pub mod fetcher;
pub mod normalizer;
pub mod snapshot;
pub mod types;

pub use crate::cache::{CacheState, SessionCache};
pub use crate::fetcher::{SessionFetcher, SessionSource};
pub use crate::types::{SubmissionCategory, Talk};

use cfp_common::config::TomlConfig;
use std::path::Path;
use std::sync::Arc;

/// Build a session cache wired to the remote platform
///
/// The snapshot lives in `data_dir`.
pub fn build_cache(
    toml_config: &TomlConfig,
    data_dir: &Path,
) -> Result<SessionCache, client::SourceError> {
    let client = client::PretalxClient::new(config::client_settings(toml_config))?;
    let fetcher = SessionFetcher::new(client);

    Ok(SessionCache::new(
        Arc::new(fetcher),
        snapshot::SnapshotStore::new(data_dir),
    ))
}
