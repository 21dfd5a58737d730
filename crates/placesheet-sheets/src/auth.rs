//! Credential acquisition as an explicit state machine.
//!
//! ```text
//! NoToken ──consent──▶ Valid
//! Expired ──refresh──▶ Valid      (refresh token present)
//! Expired ──consent──▶ Valid      (no refresh token)
//! ```
//!
//! Every transition into `Valid` other than loading an already valid file
//! persists the new token.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::consent::ConsentFlow;
use crate::error::AuthError;
use crate::oauth::TokenClient;
use crate::secrets::ClientSecrets;
use crate::token::{StoredToken, TokenStore};

/// Where a credential stands before it can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialState {
    NoToken,
    Valid(StoredToken),
    Expired(StoredToken),
}

impl CredentialState {
    #[must_use]
    pub fn classify(token: Option<StoredToken>, now: DateTime<Utc>) -> Self {
        match token {
            None => Self::NoToken,
            Some(t) if t.is_expired(now) => Self::Expired(t),
            Some(t) => Self::Valid(t),
        }
    }
}

/// Produces a usable access token, refreshing or re-consenting as needed.
pub struct Authenticator<C> {
    store: TokenStore,
    secrets_path: PathBuf,
    scopes: Vec<String>,
    tokens: TokenClient,
    consent: C,
}

impl<C: ConsentFlow> Authenticator<C> {
    pub fn new(
        store: TokenStore,
        secrets_path: impl Into<PathBuf>,
        scopes: Vec<String>,
        tokens: TokenClient,
        consent: C,
    ) -> Self {
        Self {
            store,
            secrets_path: secrets_path.into(),
            scopes,
            tokens,
            consent,
        }
    }

    /// Returns a valid token, driving the state machine from whatever is on disk.
    ///
    /// An unreadable or malformed token file is treated as no token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if a refresh or the consent flow fails, the
    /// client secrets cannot be read, or the new token cannot be persisted.
    pub async fn credential(&self) -> Result<StoredToken, AuthError> {
        let loaded = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unusable token file");
                None
            }
        };

        let mut state = CredentialState::classify(loaded, Utc::now());
        loop {
            tracing::debug!(state = state_name(&state), "credential state");
            state = match state {
                CredentialState::Valid(token) => return Ok(token),
                CredentialState::Expired(token) if token.can_refresh() => {
                    let refreshed = self.tokens.refresh(&token).await?;
                    self.store.save(&refreshed)?;
                    CredentialState::Valid(refreshed)
                }
                CredentialState::Expired(_) | CredentialState::NoToken => {
                    let secrets = ClientSecrets::load(&self.secrets_path)?;
                    let token = self
                        .consent
                        .authorize(&secrets, &self.scopes, &self.tokens)
                        .await?;
                    self.store.save(&token)?;
                    tracing::info!(path = %self.store.path().display(), "stored new credential");
                    CredentialState::Valid(token)
                }
            };
        }
    }
}

fn state_name(state: &CredentialState) -> &'static str {
    match state {
        CredentialState::NoToken => "no_token",
        CredentialState::Valid(_) => "valid",
        CredentialState::Expired(_) => "expired",
    }
}
