use std::fmt;

use async_trait::async_trait;

use super::types::{ArmorCoreResponse, SpartanResponse};
use crate::core::item::{CurrentlyEquipped, CustomKit};
use crate::core::session::GamerInfo;

/// Errors that can occur while talking to the armory backend.
/// Variants carry enough info to decide what the user sees.
#[derive(Debug)]
pub enum ApiError {
    /// Client misconfigured (bad base URL, TLS setup). Not retryable.
    Config(String),
    /// Network-level failure (DNS, connection refused, reset). Retryable.
    Network(String),
    /// No response within the configured timeout. Retryable.
    Timeout,
    /// HTTP 403: the session is no longer valid.
    Unauthorized,
    /// Backend returned another non-2xx status.
    Api { status: u16, message: String },
    /// Failed to parse the backend's response. Not retryable.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Timeout => write!(f, "request timed out"),
            ApiError::Unauthorized => write!(f, "session rejected by backend"),
            ApiError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_builder() {
            ApiError::Config(e.to_string())
        } else if e.is_decode() {
            ApiError::Parse(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// The backend API that owns game data. Everything this crate knows about
/// inventory and loadouts comes through here.
#[async_trait]
pub trait ArmoryBackend: Send + Sync {
    /// `POST /spartan?includeArmory=...`
    async fn fetch_spartan(
        &self,
        session: &GamerInfo,
        include_armory: bool,
    ) -> Result<SpartanResponse, ApiError>;

    /// `POST /getCustomKit`
    async fn fetch_custom_kits(&self, session: &GamerInfo) -> Result<Vec<CustomKit>, ApiError>;

    /// `POST /armorcore`
    async fn equip(
        &self,
        session: &GamerInfo,
        equipped: &CurrentlyEquipped,
    ) -> Result<ArmorCoreResponse, ApiError>;

    /// `GET /logout`
    async fn logout(&self) -> Result<(), ApiError>;
}
