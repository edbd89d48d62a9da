//! Remote CFP platform client
//!
//! Thin HTTP layer over the platform's submissions endpoint. Returns raw
//! records; normalization happens in [`crate::fetcher`].
//!
//! # API Reference
//! - List: `GET {base_url}/{event}/submissions/?submission_type=..&expand=..&state=..`
//! - Single: `GET {base_url}/{event}/submissions/{code}/?expand=..`
//! - Auth: `Authorization: Bearer {token}` (omitted when no token is configured)
//! - List responses are paginated: `{"results": [...], "next": "<url>" | null}`

use crate::types::{Page, RawSubmission, SubmissionCategory};
use reqwest::{header, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Nested objects requested on every call
pub const EXPAND_FIELDS: &[&str] = &[
    "answers",
    "answers.question",
    "resources",
    "slots.room",
    "speakers.answers",
    "submission_type",
    "tags",
    "tracks",
];

/// Submission states that make a session public
pub const ACCEPTED_STATES: &[&str] = &["accepted", "confirmed"];

const USER_AGENT: &str = concat!("cfp-sessions/", env!("CARGO_PKG_VERSION"));

/// Remote source errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Submission not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Connection settings for [`PretalxClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// API root, without the event segment
    pub base_url: String,
    /// Event slug
    pub event: String,
    /// Bearer token; requests are sent unauthenticated without one
    pub token: Option<String>,
    pub timeout: Duration,
    /// Minimum delay between two requests, zero disables throttling
    pub min_request_interval: Duration,
}

/// Keeps consecutive requests at least `min_interval` apart
struct Throttle {
    min_interval: Duration,
    next_allowed: Mutex<Option<Instant>>,
}

impl Throttle {
    /// `None` when the settings disable throttling
    fn from_settings(settings: &ClientSettings) -> Option<Self> {
        if settings.min_request_interval.is_zero() {
            return None;
        }
        Some(Self {
            min_interval: settings.min_request_interval,
            next_allowed: Mutex::new(None),
        })
    }

    async fn acquire(&self) {
        let mut next_allowed = self.next_allowed.lock().await;
        if let Some(at) = *next_allowed {
            tokio::time::sleep_until(at).await;
        }
        *next_allowed = Some(Instant::now() + self.min_interval);
    }
}

/// CFP platform API client
pub struct PretalxClient {
    http_client: reqwest::Client,
    submissions_url: Url,
    token: Option<String>,
    throttle: Option<Throttle>,
}

impl PretalxClient {
    pub fn new(settings: ClientSettings) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let raw_url = format!(
            "{}/{}/submissions/",
            settings.base_url.trim_end_matches('/'),
            settings.event
        );
        let submissions_url =
            Url::parse(&raw_url).map_err(|e| SourceError::InvalidUrl(format!("{}: {}", raw_url, e)))?;

        Ok(Self {
            http_client,
            submissions_url,
            throttle: Throttle::from_settings(&settings),
            token: settings.token,
        })
    }

    /// Whether requests carry a bearer token
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// URL of the first page of accepted submissions in `category`
    pub fn category_url(&self, category: SubmissionCategory) -> Url {
        let mut url = self.submissions_url.clone();
        url.query_pairs_mut()
            .append_pair("submission_type", &category.id().to_string())
            .append_pair("expand", &EXPAND_FIELDS.join(","));
        for state in ACCEPTED_STATES {
            url.query_pairs_mut().append_pair("state", state);
        }
        url
    }

    /// URL of a single submission
    pub fn submission_url(&self, code: &str) -> Result<Url, SourceError> {
        let mut url = self.submissions_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::InvalidUrl(self.submissions_url.to_string()))?
            .pop_if_empty()
            .push(code)
            .push("");
        url.query_pairs_mut()
            .append_pair("expand", &EXPAND_FIELDS.join(","));
        Ok(url)
    }

    /// Parse a `next` link from a list response
    ///
    /// Only links on the configured API origin are followed, so the bearer
    /// token never leaves that host.
    pub fn next_page_url(&self, next: &str) -> Result<Url, SourceError> {
        let url = Url::parse(next)
            .map_err(|e| SourceError::InvalidUrl(format!("next page {}: {}", next, e)))?;

        if url.origin() != self.submissions_url.origin() {
            return Err(SourceError::InvalidUrl(format!(
                "next page {} is outside {}",
                next,
                self.submissions_url.origin().ascii_serialization()
            )));
        }

        Ok(url)
    }

    /// Fetch one page of a submission list
    pub async fn fetch_page(&self, url: Url) -> Result<Page<RawSubmission>, SourceError> {
        let response = self.get(url).await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }

    /// Fetch one submission by code
    ///
    /// A 404 is reported as [`SourceError::NotFound`].
    pub async fn fetch_submission(&self, code: &str) -> Result<RawSubmission, SourceError> {
        let url = self.submission_url(code)?;
        let response = self.get(url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(code.to_string()));
        }

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, SourceError> {
        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        debug!(url = %url, "Querying CFP API");

        let mut request = self.http_client.get(url);
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        request
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))
    }
}

async fn error_from_response(response: reqwest::Response) -> SourceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    SourceError::Api(status.as_u16(), body)
}
