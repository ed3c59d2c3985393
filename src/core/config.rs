//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.armory/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ArmoryConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Where the client fetches images from.
    pub base_url: Option<String>,
    /// Port the `proxy` command listens on.
    pub port: Option<u16>,
    /// Third-party image host the proxy forwards to.
    pub upstream_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    pub path: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_PROXY_PORT: u16 = 3002;
pub const DEFAULT_PROXY_BASE_URL: &str = "http://localhost:3002";
pub const DEFAULT_UPSTREAM_BASE_URL: &str =
    "https://gamecms-hacs.svc.halowaypoint.com/hi/images/file";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    pub proxy_base_url: String,
    pub proxy_port: u16,
    pub upstream_base_url: String,
    pub timeout: Duration,
    pub session_path: Option<PathBuf>,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub api_base_url: Option<String>,
    pub proxy_port: Option<u16>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.armory/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".armory").join("config.toml"))
}

/// Load config from `~/.armory/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ArmoryConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ArmoryConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ArmoryConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ArmoryConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: ArmoryConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# Armory Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [api]
# base_url = "http://localhost:3001"     # Or set ARMORY_API_BASE_URL
# timeout_secs = 15                      # Or set ARMORY_TIMEOUT_SECS

# [proxy]
# base_url = "http://localhost:3002"     # Or set ARMORY_PROXY_BASE_URL
# port = 3002                            # Or set ARMORY_PROXY_PORT
# upstream_base_url = "https://gamecms-hacs.svc.halowaypoint.com/hi/images/file"

# [session]
# path = "/home/me/.armory/session.json"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ArmoryConfig, cli: &CliOverrides) -> ResolvedConfig {
    // API base URL: CLI → env → config → default
    let api_base_url = cli
        .api_base_url
        .clone()
        .or_else(|| std::env::var("ARMORY_API_BASE_URL").ok())
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let proxy_base_url = std::env::var("ARMORY_PROXY_BASE_URL")
        .ok()
        .or_else(|| config.proxy.base_url.clone())
        .unwrap_or_else(|| DEFAULT_PROXY_BASE_URL.to_string());

    let upstream_base_url = std::env::var("ARMORY_UPSTREAM_BASE_URL")
        .ok()
        .or_else(|| config.proxy.upstream_base_url.clone())
        .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

    let proxy_port = cli
        .proxy_port
        .or_else(|| env_parse("ARMORY_PROXY_PORT"))
        .or(config.proxy.port)
        .unwrap_or(DEFAULT_PROXY_PORT);

    let timeout_secs = env_parse("ARMORY_TIMEOUT_SECS")
        .or(config.api.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let session_path = config
        .session
        .path
        .as_ref()
        .map(PathBuf::from)
        .or_else(crate::core::session::default_session_path);

    ResolvedConfig {
        api_base_url: trim_base(api_base_url),
        proxy_base_url: trim_base(proxy_base_url),
        proxy_port,
        upstream_base_url: trim_base(upstream_base_url),
        timeout: Duration::from_secs(timeout_secs),
        session_path,
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {key} value: {raw}");
            None
        }
    }
}

/// Base URLs are joined with `/path`, so drop any trailing slash.
fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
