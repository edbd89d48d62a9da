//! In-memory session source that counts calls

use async_trait::async_trait;
use cfp_sessions::client::SourceError;
use cfp_sessions::{SessionSource, SubmissionCategory, Talk};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct FakeSource {
    talks: Vec<Talk>,
    configured: bool,
    fail_bulk: bool,
    delay: Duration,
    category_calls: AtomicUsize,
    code_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(talks: Vec<Talk>) -> Self {
        Self {
            talks,
            configured: true,
            fail_bulk: false,
            delay: Duration::ZERO,
            category_calls: AtomicUsize::new(0),
            code_calls: AtomicUsize::new(0),
        }
    }

    /// Report missing credentials
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Fail every category fetch with a 500
    pub fn failing_bulk(mut self) -> Self {
        self.fail_bulk = true;
        self
    }

    /// Sleep before answering category fetches
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn category_calls(&self) -> usize {
        self.category_calls.load(Ordering::SeqCst)
    }

    pub fn code_calls(&self) -> usize {
        self.code_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionSource for FakeSource {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn fetch_by_category(
        &self,
        category: SubmissionCategory,
    ) -> Result<Vec<Talk>, SourceError> {
        self.category_calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail_bulk {
            return Err(SourceError::Api(500, "internal error".to_string()));
        }

        Ok(self
            .talks
            .iter()
            .filter(|t| t.submission_type_id == category.id())
            .cloned()
            .collect())
    }

    async fn fetch_by_code(&self, code: &str) -> Result<Option<Talk>, SourceError> {
        self.code_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.talks.iter().find(|t| t.code == code).cloned())
    }
}
