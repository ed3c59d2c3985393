//! # Session Context
//!
//! The stored gamer-identity record, persisted at `~/.armory/session.json`.
//!
//! `SessionContext` is the only code that reads or writes that file. Callers
//! receive the context explicitly and go through `current()`, `replace()`
//! and `clear()`; nothing else touches session storage.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The identity record the backend expects with every authenticated request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct GamerInfo {
    #[serde(default)]
    pub gamertag: String,
    #[serde(default)]
    pub xuid: String,
    /// Equip credential. Also sent to the image proxy.
    #[serde(rename = "SpartanKey", default)]
    pub spartan_key: String,
    #[serde(rename = "Clearance", default, skip_serializing_if = "Option::is_none")]
    pub clearance: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GamerInfo {
    pub fn has_credential(&self) -> bool {
        !self.spartan_key.trim().is_empty()
    }
}

/// On-disk shape of the session file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredSession {
    pub saved_at: DateTime<Utc>,
    pub gamer_info: GamerInfo,
}

#[derive(Debug)]
pub enum SessionError {
    Io(io::Error),
    Parse(serde_json::Error),
    /// No session stored (never logged in, or logged out).
    Missing,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Io(e) => write!(f, "session I/O error: {e}"),
            SessionError::Parse(e) => write!(f, "session parse error: {e}"),
            SessionError::Missing => write!(f, "not logged in"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Returns `~/.armory/session.json`.
pub fn default_session_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".armory").join("session.json"))
}

/// Single read/write boundary for the persisted session record.
#[derive(Debug)]
pub struct SessionContext {
    path: PathBuf,
    current: Option<GamerInfo>,
}

impl SessionContext {
    /// Opens the session stored at `path`. A missing file is not an error:
    /// the context simply starts logged out.
    pub fn open(path: PathBuf) -> Result<Self, SessionError> {
        let current = match fs::read_to_string(&path) {
            Ok(json) => {
                let stored: StoredSession =
                    serde_json::from_str(&json).map_err(SessionError::Parse)?;
                debug!(
                    "Loaded session for {} (saved {})",
                    stored.gamer_info.gamertag, stored.saved_at
                );
                Some(stored.gamer_info)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(SessionError::Io(e)),
        };
        Ok(Self { path, current })
    }

    /// The session record, read before every authenticated request.
    pub fn current(&self) -> Result<&GamerInfo, SessionError> {
        self.current.as_ref().ok_or(SessionError::Missing)
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// Stores a refreshed record. Skips the write when nothing changed.
    pub fn replace(&mut self, info: GamerInfo) -> Result<(), SessionError> {
        if self.current.as_ref() == Some(&info) {
            return Ok(());
        }
        let stored = StoredSession {
            saved_at: Utc::now(),
            gamer_info: info,
        };
        atomic_write_json(&self.path, &stored)?;
        info!("Session saved for {}", stored.gamer_info.gamertag);
        self.current = Some(stored.gamer_info);
        Ok(())
    }

    /// Forgets the session, in memory and on disk.
    pub fn clear(&mut self) {
        self.current = None;
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Session cleared"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove session file: {}", e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), SessionError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(SessionError::Io)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data).map_err(SessionError::Parse)?;
    fs::write(&tmp_path, json).map_err(SessionError::Io)?;
    fs::rename(&tmp_path, path).map_err(SessionError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{gamer_info, temp_session_path};

    #[test]
    fn test_missing_file_starts_logged_out() {
        let ctx = SessionContext::open(temp_session_path("missing")).unwrap();
        assert!(!ctx.is_logged_in());
        assert!(matches!(ctx.current(), Err(SessionError::Missing)));
    }

    #[test]
    fn test_replace_persists_and_reopens() {
        let path = temp_session_path("persist");
        let mut ctx = SessionContext::open(path.clone()).unwrap();
        ctx.replace(gamer_info("key-1")).unwrap();

        let reopened = SessionContext::open(path.clone()).unwrap();
        assert_eq!(reopened.current().unwrap().spartan_key, "key-1");
        assert_eq!(reopened.current().unwrap().gamertag, "Chief");

        let mut reopened = reopened;
        reopened.clear();
        assert!(!path.exists());
        assert!(!reopened.is_logged_in());
    }

    #[test]
    fn test_unknown_fields_survive() {
        let json = r#"{"gamertag":"Chief","xuid":"1","SpartanKey":"k","Token":{"a":1}}"#;
        let info: GamerInfo = serde_json::from_str(json).unwrap();
        let back = serde_json::to_value(&info).unwrap();
        assert_eq!(back["Token"]["a"], 1);
    }

    #[test]
    fn test_blank_key_is_not_a_credential() {
        assert!(!gamer_info("  ").has_credential());
        assert!(gamer_info("abc").has_credential());
    }
}
