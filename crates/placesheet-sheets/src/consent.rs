//! Interactive authorization: the user grants access in a browser and the
//! provider redirects back to a one-shot listener on the loopback interface.

use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Url;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::error::AuthError;
use crate::oauth::TokenClient;
use crate::secrets::ClientSecrets;
use crate::token::StoredToken;

/// A way of obtaining a brand-new token with the user's consent.
#[allow(async_fn_in_trait)]
pub trait ConsentFlow {
    async fn authorize(
        &self,
        secrets: &ClientSecrets,
        scopes: &[String],
        tokens: &TokenClient,
    ) -> Result<StoredToken, AuthError>;
}

/// Authorization-code flow with PKCE and a loopback redirect listener.
#[derive(Debug, Clone)]
pub struct LoopbackConsent {
    /// How long to wait for the browser to come back.
    pub timeout: Duration,
    /// Try to open the authorization URL in the default browser.
    pub open_browser: bool,
}

impl Default for LoopbackConsent {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            open_browser: true,
        }
    }
}

impl ConsentFlow for LoopbackConsent {
    async fn authorize(
        &self,
        secrets: &ClientSecrets,
        scopes: &[String],
        tokens: &TokenClient,
    ) -> Result<StoredToken, AuthError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| AuthError::Consent(format!("failed to bind local listener: {e}")))?;
        let open_browser = self.open_browser;
        self.authorize_on(listener, secrets, scopes, tokens, |url| {
            eprintln!("Please visit this URL to authorize this application: {url}");
            if open_browser {
                if let Err(e) = open::that(url.as_str()) {
                    tracing::warn!(error = %e, "could not open browser automatically");
                }
            }
        })
        .await
    }
}

impl LoopbackConsent {
    /// Runs the flow against an already bound `listener`.
    ///
    /// `present` receives the authorization URL the user has to visit.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ConsentTimeout`] if no callback arrives in time.
    /// - [`AuthError::StateMismatch`] if the callback carries a foreign `state`.
    /// - [`AuthError::Consent`] if the user denies access or the listener fails.
    /// - Any error from the code exchange.
    pub async fn authorize_on<F>(
        &self,
        listener: TcpListener,
        secrets: &ClientSecrets,
        scopes: &[String],
        tokens: &TokenClient,
        present: F,
    ) -> Result<StoredToken, AuthError>
    where
        F: FnOnce(&Url),
    {
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::Consent(format!("listener has no local address: {e}")))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{port}/");
        let verifier = random_token::<32>();
        let state = random_token::<16>();

        let url = authorization_url(secrets, scopes, &redirect_uri, &state, &code_challenge(&verifier))?;
        tracing::info!(%redirect_uri, "waiting for authorization callback");
        present(&url);

        let code = tokio::time::timeout(self.timeout, accept_code(&listener, &state))
            .await
            .map_err(|_| AuthError::ConsentTimeout(self.timeout.as_secs()))??;

        tokens
            .exchange_code(secrets, &code, &verifier, &redirect_uri, scopes)
            .await
    }
}

/// What the provider sent back to the redirect URI.
#[derive(Debug, PartialEq, Eq)]
enum Callback {
    Code { code: String, state: String },
    Denied { error: String, description: String },
}

/// How long one accepted connection may take to send its request head.
const REQUEST_READ_TIMEOUT: Duration = Duration::from_secs(2);

async fn accept_code(listener: &TcpListener, expected_state: &str) -> Result<String, AuthError> {
    let io = |e: std::io::Error| AuthError::Consent(format!("callback listener failed: {e}"));
    loop {
        let (socket, _) = listener.accept().await.map_err(io)?;
        let mut reader = BufReader::new(socket);

        // Browsers open speculative connections that never send a request.
        let request_line =
            match tokio::time::timeout(REQUEST_READ_TIMEOUT, read_request_head(&mut reader)).await
            {
                Ok(Ok(line)) => line,
                Ok(Err(e)) => {
                    tracing::debug!(error = %e, "dropping unreadable callback connection");
                    continue;
                }
                Err(_) => {
                    tracing::debug!("dropping idle callback connection");
                    continue;
                }
            };
        let socket = reader.get_mut();

        match parse_callback(&request_line) {
            Some(Callback::Code { code, state }) => {
                if state != expected_state {
                    respond(socket, "400 Bad Request", "Invalid state parameter.")
                        .await
                        .map_err(io)?;
                    return Err(AuthError::StateMismatch);
                }
                respond(
                    socket,
                    "200 OK",
                    "The authentication flow has completed. You may close this window.",
                )
                .await
                .map_err(io)?;
                return Ok(code);
            }
            Some(Callback::Denied { error, description }) => {
                respond(socket, "400 Bad Request", "Authorization was denied.")
                    .await
                    .map_err(io)?;
                return Err(AuthError::Consent(format!("{error}: {description}")));
            }
            // Favicon and other stray requests.
            None => respond(socket, "404 Not Found", "Not found.")
                .await
                .map_err(io)?,
        }
    }
}

/// Reads the request line and drains the headers so closing the socket does
/// not reset the connection.
async fn read_request_head(reader: &mut BufReader<TcpStream>) -> std::io::Result<String> {
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut header = String::new();
    loop {
        header.clear();
        let read = reader.read_line(&mut header).await?;
        if read == 0 || header.trim_end().is_empty() {
            return Ok(request_line);
        }
    }
}

/// Parses the request line of a redirect, e.g. `GET /?state=..&code=.. HTTP/1.1`.
fn parse_callback(request_line: &str) -> Option<Callback> {
    let target = request_line.split_whitespace().nth(1)?;
    let url = Url::parse(&format!("http://127.0.0.1{target}")).ok()?;
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        return Some(Callback::Denied {
            error,
            description: param("error_description").unwrap_or_default(),
        });
    }
    Some(Callback::Code {
        code: param("code")?,
        state: param("state").unwrap_or_default(),
    })
}

async fn respond(socket: &mut TcpStream, status: &str, message: &str) -> std::io::Result<()> {
    let body = format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>placesheet</title></head>\
         <body><p>{message}</p></body></html>"
    );
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    socket.write_all(response.as_bytes()).await?;
    socket.flush().await
}

fn authorization_url(
    secrets: &ClientSecrets,
    scopes: &[String],
    redirect_uri: &str,
    state: &str,
    challenge: &str,
) -> Result<Url, AuthError> {
    let mut url = Url::parse(&secrets.auth_uri).map_err(|e| {
        AuthError::Consent(format!("invalid auth_uri '{}': {e}", secrets.auth_uri))
    })?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &secrets.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", &scopes.join(" "))
        .append_pair("state", state)
        .append_pair("code_challenge", challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent");
    Ok(url)
}

/// S256 PKCE challenge for `verifier`.
fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// `N` random bytes, base64url-encoded without padding.
fn random_token<const N: usize>() -> String {
    let bytes: [u8; N] = std::array::from_fn(|_| rand::random::<u8>());
    URL_SAFE_NO_PAD.encode(bytes)
}
