//! Remote source configuration
//!
//! Resolves the CFP platform settings from environment and TOML, with the
//! compiled defaults as the last resort.
//!
//! **Token priority:** ENV (`CFP_PRETALX_TOKEN`) → TOML (`[pretalx] token`)

use crate::client::ClientSettings;
use cfp_common::config::{CompiledDefaults, TomlConfig};
use cfp_common::{Error, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "CFP_PRETALX_TOKEN";

/// Validate API token (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the API token
pub fn resolve_api_token(toml_config: &TomlConfig) -> Result<String> {
    let env_key = std::env::var(TOKEN_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config
        .pretalx
        .token
        .as_ref()
        .filter(|k| is_valid_key(k));

    // Warn if multiple sources (potential misconfiguration)
    if env_key.is_some() && toml_key.is_some() {
        warn!(
            "API token found in both environment and TOML config. Using environment (highest priority)."
        );
    }

    if let Some(key) = env_key {
        info!("API token loaded from environment variable");
        return Ok(key);
    }

    if let Some(key) = toml_key {
        info!("API token loaded from TOML config");
        return Ok(key.clone());
    }

    Err(Error::Config(format!(
        "API token not configured. Please configure using one of:\n\
         1. Environment: {}=your-token\n\
         2. TOML config: [pretalx] token = \"your-token\"",
        TOKEN_ENV
    )))
}

/// Build client settings from configuration
///
/// A missing token is not an error here: the client is built without one and
/// the cache will run degraded.
pub fn client_settings(toml_config: &TomlConfig) -> ClientSettings {
    let defaults = CompiledDefaults::default();
    let pretalx = &toml_config.pretalx;

    let token = match resolve_api_token(toml_config) {
        Ok(token) => Some(token),
        Err(e) => {
            warn!("{}", e);
            None
        }
    };

    ClientSettings {
        base_url: pretalx.base_url.clone().unwrap_or(defaults.base_url),
        event: pretalx.event.clone().unwrap_or(defaults.event),
        token,
        timeout: Duration::from_secs(pretalx.timeout_secs.unwrap_or(defaults.timeout_secs)),
        min_request_interval: Duration::from_millis(
            pretalx
                .min_request_interval_ms
                .unwrap_or(defaults.min_request_interval_ms),
        ),
    }
}
