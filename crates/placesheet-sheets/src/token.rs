//! The persisted OAuth credential and the file it lives in.
//!
//! The file uses the authorized-user JSON layout (`token`, `refresh_token`,
//! `token_uri`, `client_id`, `client_secret`, `scopes`, `expiry`) so tokens
//! written by other tools load unchanged. It is written as plaintext.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// A token this close to its expiry is already treated as expired, so it
/// cannot lapse while a request is in flight.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Bearer access token.
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// `None` means the token never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// `true` once `now` is within [`EXPIRY_MARGIN_SECS`] of the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| {
            now + chrono::Duration::seconds(EXPIRY_MARGIN_SECS) >= expiry
        })
    }

    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Reads and writes the credential file.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token. A missing file is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the file exists but cannot be read, or
    /// [`AuthError::TokenFormat`] if it is not a valid token document.
    pub fn load(&self) -> Result<Option<StoredToken>, AuthError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AuthError::Io {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| AuthError::TokenFormat {
                path: self.path.display().to_string(),
                source: e,
            })
    }

    /// Overwrites the file with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the file cannot be written.
    pub fn save(&self, token: &StoredToken) -> Result<(), AuthError> {
        let io_err = |e| AuthError::Io {
            path: self.path.display().to_string(),
            source: e,
        };
        let json = serde_json::to_string_pretty(token).map_err(|e| AuthError::TokenFormat {
            path: self.path.display().to_string(),
            source: e,
        })?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), "token saved");
        Ok(())
    }
}
