//! Token endpoint calls: authorization-code exchange and refresh.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AuthError;
use crate::secrets::ClientSecrets;
use crate::token::StoredToken;

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// HTTP client for the OAuth token endpoint.
pub struct TokenClient {
    client: Client,
}

impl TokenClient {
    /// # Errors
    ///
    /// Returns [`AuthError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }

    /// Exchanges an authorization code for a token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::TokenEndpoint`] on a non-2xx response.
    /// - [`AuthError::Http`] on network failure or an undecodable body.
    pub async fn exchange_code(
        &self,
        secrets: &ClientSecrets,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> Result<StoredToken, AuthError> {
        tracing::info!("exchanging authorization code for tokens");
        let params = [
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("code", code),
            ("code_verifier", code_verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];
        let response = self.post_form(&secrets.token_uri, &params).await?;

        Ok(StoredToken {
            token: response.access_token,
            refresh_token: response.refresh_token,
            token_uri: secrets.token_uri.clone(),
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            scopes: granted_scopes(response.scope.as_deref(), scopes),
            expiry: response
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }

    /// Refreshes `token` in place of a new consent.
    ///
    /// The refresh token is carried over when the endpoint does not rotate it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Consent`] if `token` has no refresh token.
    /// - [`AuthError::TokenEndpoint`] on a non-2xx response.
    /// - [`AuthError::Http`] on network failure or an undecodable body.
    pub async fn refresh(&self, token: &StoredToken) -> Result<StoredToken, AuthError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::Consent("token has no refresh token".to_owned()))?;

        tracing::info!("refreshing access token");
        let params = [
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        let response = self.post_form(&token.token_uri, &params).await?;

        Ok(StoredToken {
            token: response.access_token,
            refresh_token: response
                .refresh_token
                .or_else(|| token.refresh_token.clone()),
            token_uri: token.token_uri.clone(),
            client_id: token.client_id.clone(),
            client_secret: token.client_secret.clone(),
            scopes: granted_scopes(response.scope.as_deref(), &token.scopes),
            expiry: response
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }

    async fn post_form(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<TokenResponse, AuthError> {
        let response = self.client.post(url).form(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<TokenResponse>().await?)
    }
}

/// Scopes reported by the endpoint, or the requested ones when it omits them.
fn granted_scopes(reported: Option<&str>, requested: &[String]) -> Vec<String> {
    match reported {
        Some(s) if !s.trim().is_empty() => s.split_whitespace().map(str::to_owned).collect(),
        _ => requested.to_vec(),
    }
}
