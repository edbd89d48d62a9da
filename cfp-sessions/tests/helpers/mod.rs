//! Test Helper Utilities
//!
//! Shared utilities for testing cfp-sessions

#![allow(dead_code)]

pub mod fake_source;
pub mod fixtures;
pub mod mock_cfp;

// Re-export commonly used items
pub use fake_source::FakeSource;
pub use fixtures::{raw_submission, raw_submissions, talk};
pub use mock_cfp::{MockCfp, MockCfpServer, RecordedRequest};
