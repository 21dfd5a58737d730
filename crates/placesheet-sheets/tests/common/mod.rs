//! Shared fixtures for the sheets integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{Duration, Utc};
use placesheet_sheets::{
    AuthError, Authenticator, ClientSecrets, ConsentFlow, StoredToken, TokenClient, TokenStore,
    SPREADSHEETS_SCOPE,
};

/// Consent flow that hands out a fixed token and counts how often it ran.
pub struct CountingConsent {
    pub calls: AtomicU32,
    pub fail: bool,
}

impl CountingConsent {
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConsentFlow for &CountingConsent {
    async fn authorize(
        &self,
        secrets: &ClientSecrets,
        scopes: &[String],
        _tokens: &TokenClient,
    ) -> Result<StoredToken, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AuthError::Consent("access_denied: user said no".to_owned()));
        }
        Ok(StoredToken {
            token: "ya29.from-consent".to_owned(),
            refresh_token: Some("1//from-consent".to_owned()),
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: scopes.to_vec(),
            expiry: Some(Utc::now() + Duration::hours(1)),
        })
    }
}

pub fn token(token_uri: &str, minutes_left: i64, refresh: Option<&str>) -> StoredToken {
    StoredToken {
        token: "ya29.stored".to_owned(),
        refresh_token: refresh.map(str::to_owned),
        token_uri: token_uri.to_owned(),
        client_id: "id.apps.googleusercontent.com".to_owned(),
        client_secret: "shh".to_owned(),
        scopes: vec![SPREADSHEETS_SCOPE.to_owned()],
        expiry: Some(Utc::now() + Duration::minutes(minutes_left)),
    }
}

pub fn write_secrets(dir: &Path, token_uri: &str) -> PathBuf {
    let path = dir.join("credentials.json");
    let body = serde_json::json!({
        "installed": {
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "shh",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": token_uri,
        }
    });
    std::fs::write(&path, body.to_string()).expect("write secrets");
    path
}

pub fn authenticator<'a>(
    dir: &Path,
    token_uri: &str,
    consent: &'a CountingConsent,
) -> Authenticator<&'a CountingConsent> {
    let secrets = write_secrets(dir, token_uri);
    Authenticator::new(
        TokenStore::new(dir.join("token.json")),
        secrets,
        vec![SPREADSHEETS_SCOPE.to_owned()],
        TokenClient::new(5).expect("token client"),
        consent,
    )
}
