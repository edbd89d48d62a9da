//! Session fetcher
//!
//! Drives paginated retrieval from the remote platform and normalizes the
//! results. Exposed to the cache through the [`SessionSource`] trait.
//!
//! Failures are not retried: a network error or non-404 status on any page
//! fails the whole category call, and pages already received are discarded.

use crate::client::{PretalxClient, SourceError};
use crate::normalizer::normalize;
use crate::types::{RawSubmission, SubmissionCategory, Talk};
use async_trait::async_trait;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Provider of normalized sessions
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Whether the source has the credentials needed for bulk retrieval
    ///
    /// The cache skips generation entirely when this returns `false`.
    fn is_configured(&self) -> bool {
        true
    }

    /// All accepted sessions of `category`, in source order
    async fn fetch_by_category(
        &self,
        category: SubmissionCategory,
    ) -> Result<Vec<Talk>, SourceError>;

    /// One session by code, `None` when the source does not know it
    async fn fetch_by_code(&self, code: &str) -> Result<Option<Talk>, SourceError>;
}

/// [`SessionSource`] backed by the remote CFP platform
pub struct SessionFetcher {
    client: PretalxClient,
}

impl SessionFetcher {
    pub fn new(client: PretalxClient) -> Self {
        Self { client }
    }

    /// Follow the `next` chain for `category` and collect every raw record
    ///
    /// Pages are requested strictly one after another. A `next` link to a
    /// page already requested ends the chain.
    pub async fn fetch_raw_by_category(
        &self,
        category: SubmissionCategory,
    ) -> Result<Vec<RawSubmission>, SourceError> {
        let mut records = Vec::new();
        let mut visited = HashSet::new();
        let mut next_url = Some(self.client.category_url(category));
        let mut pages = 0usize;

        while let Some(url) = next_url.take() {
            visited.insert(url.clone());
            let page = self.client.fetch_page(url).await?;
            pages += 1;

            debug!(
                category = %category,
                page = pages,
                results = page.results.len(),
                has_next = page.next.is_some(),
                "Received submissions page"
            );

            records.extend(page.results);

            next_url = match page.next {
                Some(next) => Some(self.client.next_page_url(&next)?),
                None => None,
            };

            if next_url.as_ref().is_some_and(|url| visited.contains(url)) {
                warn!(
                    category = %category,
                    pages = pages,
                    "Pagination loops back to a page already fetched, stopping"
                );
                next_url = None;
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl SessionSource for SessionFetcher {
    fn is_configured(&self) -> bool {
        self.client.has_token()
    }

    async fn fetch_by_category(
        &self,
        category: SubmissionCategory,
    ) -> Result<Vec<Talk>, SourceError> {
        let records = self.fetch_raw_by_category(category).await?;
        let talks: Vec<Talk> = records.iter().map(normalize).collect();

        info!(
            category = %category,
            sessions = talks.len(),
            "Fetched sessions"
        );

        Ok(talks)
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Option<Talk>, SourceError> {
        match self.client.fetch_submission(code).await {
            Ok(raw) => Ok(Some(normalize(&raw))),
            Err(SourceError::NotFound(_)) => {
                debug!(code = %code, "Submission not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
