//! In-process mock of the CFP platform API
//!
//! Serves paginated submission lists and single submissions from canned JSON,
//! and records every request it receives.

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cfp_sessions::client::{ClientSettings, PretalxClient};
use cfp_sessions::SessionFetcher;
use reqwest::Url;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const EVENT: &str = "techconf-2025";

/// One request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
}

impl RecordedRequest {
    /// All values of query parameter `key`, in order
    pub fn params(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// Replacement `next` link for one page
#[derive(Clone)]
enum NextLink {
    /// Link to another page index of the same category
    Page(usize),
    /// Link verbatim
    Url(String),
}

#[derive(Default)]
struct MockState {
    base_url: String,
    /// submission type id → pages of results
    pages: HashMap<i64, Vec<Vec<Value>>>,
    submissions: HashMap<String, Value>,
    /// (submission type id, page index, status) to answer with an error
    failing_page: Option<(i64, usize, StatusCode)>,
    failing_submission: Option<StatusCode>,
    /// (submission type id, page index) → overridden `next` link
    next_links: HashMap<(i64, usize), NextLink>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Builder for a mock CFP server
#[derive(Default)]
pub struct MockCfp {
    state: MockState,
}

impl MockCfp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pages` for submission type `category_id`
    pub fn with_pages(mut self, category_id: i64, pages: Vec<Vec<Value>>) -> Self {
        self.state.pages.insert(category_id, pages);
        self
    }

    /// Serve `submission` on the single-record endpoint
    pub fn with_submission(mut self, submission: Value) -> Self {
        let code = submission["code"].as_str().unwrap_or_default().to_string();
        self.state.submissions.insert(code, submission);
        self
    }

    /// Answer page `page_index` (0-based) of `category_id` with `status`
    pub fn failing_page(mut self, category_id: i64, page_index: usize, status: u16) -> Self {
        self.state.failing_page = Some((
            category_id,
            page_index,
            StatusCode::from_u16(status).unwrap(),
        ));
        self
    }

    /// Point the `next` link of page `page_index` back to page `target_index`
    pub fn looping_page(
        mut self,
        category_id: i64,
        page_index: usize,
        target_index: usize,
    ) -> Self {
        self.state
            .next_links
            .insert((category_id, page_index), NextLink::Page(target_index));
        self
    }

    /// Point the `next` link of page `page_index` at `url`
    pub fn with_next_url(mut self, category_id: i64, page_index: usize, url: &str) -> Self {
        self.state
            .next_links
            .insert((category_id, page_index), NextLink::Url(url.to_string()));
        self
    }

    /// Answer every single-record request with `status`
    pub fn failing_submissions(mut self, status: u16) -> Self {
        self.state.failing_submission = Some(StatusCode::from_u16(status).unwrap());
        self
    }

    pub async fn start(mut self) -> MockCfpServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        self.state.base_url = format!("http://127.0.0.1:{}/api/events", port);

        let state = Arc::new(self.state);
        let app = Router::new()
            .route("/api/events/:event/submissions/", get(list_submissions))
            .route("/api/events/:event/submissions/:code/", get(get_submission))
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockCfpServer { state, handle }
    }
}

/// Running mock server; stops when dropped
pub struct MockCfpServer {
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockCfpServer {
    pub fn base_url(&self) -> &str {
        &self.state.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn settings(&self, token: Option<&str>) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url().to_string(),
            event: EVENT.to_string(),
            token: token.map(str::to_string),
            timeout: Duration::from_secs(5),
            min_request_interval: Duration::ZERO,
        }
    }

    /// Fetcher pointed at this server
    pub fn fetcher(&self, token: Option<&str>) -> SessionFetcher {
        SessionFetcher::new(PretalxClient::new(self.settings(token)).unwrap())
    }
}

impl Drop for MockCfpServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn record(
    state: &MockState,
    path: String,
    query: &Option<String>,
    headers: &HeaderMap,
) -> Vec<(String, String)> {
    let pairs: Vec<(String, String)> = match query {
        Some(q) => Url::parse(&format!("http://mock/?{}", q))
            .unwrap()
            .query_pairs()
            .into_owned()
            .collect(),
        None => Vec::new(),
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        path,
        query: pairs.clone(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    pairs
}

async fn list_submissions(
    State(state): State<Arc<MockState>>,
    Path(event): Path<String>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let pairs = record(
        &state,
        format!("/api/events/{}/submissions/", event),
        &query,
        &headers,
    );
    let param = |key: &str| {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let category_id: i64 = match param("submission_type").and_then(|v| v.parse().ok()) {
        Some(id) => id,
        None => return (StatusCode::BAD_REQUEST, "missing submission_type").into_response(),
    };
    let page_index: usize = param("page").and_then(|v| v.parse().ok()).unwrap_or(0);

    if let Some((failing_category, failing_index, status)) = state.failing_page {
        if failing_category == category_id && failing_index == page_index {
            return (status, "upstream failure").into_response();
        }
    }

    let pages = state.pages.get(&category_id).cloned().unwrap_or_default();
    let results = pages.get(page_index).cloned().unwrap_or_default();
    let page_link = |index: usize| {
        Value::String(format!(
            "{}/{}/submissions/?submission_type={}&page={}",
            state.base_url, event, category_id, index
        ))
    };
    let next = match state.next_links.get(&(category_id, page_index)) {
        Some(NextLink::Page(index)) => page_link(*index),
        Some(NextLink::Url(url)) => Value::String(url.clone()),
        None if page_index + 1 < pages.len() => page_link(page_index + 1),
        None => Value::Null,
    };

    Json(json!({
        "count": pages.iter().map(Vec::len).sum::<usize>(),
        "next": next,
        "previous": null,
        "results": results,
    }))
    .into_response()
}

async fn get_submission(
    State(state): State<Arc<MockState>>,
    Path((event, code)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    record(
        &state,
        format!("/api/events/{}/submissions/{}/", event, code),
        &query,
        &headers,
    );

    if let Some(status) = state.failing_submission {
        return (status, "upstream failure").into_response();
    }

    match state.submissions.get(&code) {
        Some(submission) => Json(submission.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}
