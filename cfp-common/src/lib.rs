//! # CFP Common Library
//!
//! Shared code for the conference session tooling:
//! - Error types
//! - Bootstrap configuration (TOML) and data directory resolution
//! - Atomic file writes

pub mod config;
pub mod error;

pub use error::{Error, Result};
