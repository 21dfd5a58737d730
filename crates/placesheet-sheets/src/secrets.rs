//! OAuth client secrets as downloaded from the cloud console.

use std::path::Path;

use serde::Deserialize;

use crate::error::AuthError;

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Desktop ("installed") or web OAuth client credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_owned()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_owned()
}

impl ClientSecrets {
    /// Reads a client secrets file with an `installed` or `web` section.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Io`] if the file cannot be read and
    /// [`AuthError::SecretsFormat`] if it has neither section or is not JSON.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AuthError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&raw).map_err(|reason| AuthError::SecretsFormat {
            path: path.display().to_string(),
            reason,
        })
    }

    fn parse(raw: &str) -> Result<Self, String> {
        let file: SecretsFile = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        file.installed
            .or(file.web)
            .ok_or_else(|| "expected an \"installed\" or \"web\" section".to_owned())
    }
}
