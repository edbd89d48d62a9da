//! Bootstrap configuration loading and data directory resolution
//!
//! Resolution priority for the data directory:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`CFP_DATA_DIR`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and the compiled
//! defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "CFP_DATA_DIR";

/// Application folder name under the platform config directory
const APP_DIR_NAME: &str = "cfp-sessions";

/// Compiled-in defaults used when neither the environment nor TOML provide a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub base_url: String,
    pub event: String,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            base_url: "https://pretalx.com/api/events".to_string(),
            event: "techconf-2025".to_string(),
            timeout_secs: 30,
            min_request_interval_ms: 0,
        }
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Directory holding the session snapshot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Remote CFP platform settings (optional)
    #[serde(default)]
    pub pretalx: PretalxConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Remote CFP platform configuration
///
/// Every field is optional; unset fields fall back to [`CompiledDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PretalxConfig {
    /// API base URL, without the event segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Event slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    /// API token sent as a bearer credential
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Minimum delay between two requests (0 disables throttling)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_request_interval_ms: Option<u64>,
}

fn default_log_level() -> String {
    CompiledDefaults::default().log_level
}

/// Default location of the TOML config file for this platform
///
/// `~/.config/cfp-sessions/config.toml` on Linux, the platform equivalent elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Load the TOML config file
///
/// Uses `path` when given, otherwise [`default_config_path`]. A missing file
/// yields `TomlConfig::default()` with a warning; a file that exists but does
/// not parse is a configuration error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(p) => p,
        None => {
            warn!("Could not determine config directory, using built-in defaults");
            return Ok(TomlConfig::default());
        }
    };

    if !path.exists() {
        warn!(
            "Config file not found at {}, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the data directory following the documented priority order
pub fn resolve_data_dir(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.data_dir {
        return path.clone();
    }

    // Priority 4: Compiled default
    CompiledDefaults::default().data_dir
}

/// Write `config` to `path` atomically
///
/// The file may contain an API token, so on Unix it is created with mode 0600.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    write_atomic(path, content.as_bytes(), true)
}

/// Write `bytes` to `path` via a sibling temp file and rename
///
/// Parent directories are created on demand. Readers never observe a
/// partially written file. With `private` set, the file is restricted to the
/// owner on Unix.
pub fn write_atomic(path: &Path, bytes: &[u8], private: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if private {
            std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    #[cfg(not(unix))]
    let _ = private;

    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}
