use thiserror::Error;

/// Errors raised while obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("client secrets file {path} is malformed: {reason}")]
    SecretsFormat { path: String, reason: String },

    #[error("token file {path} is malformed: {source}")]
    TokenFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with a non-2xx status.
    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    /// The local consent listener failed or the user denied access.
    #[error("authorization consent failed: {0}")]
    Consent(String),

    #[error("authorization callback state did not match the request")]
    StateMismatch,

    #[error("no authorization callback within {0}s")]
    ConsentTimeout(u64),
}

/// Errors raised while writing to a spreadsheet.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Sheets API answered with a non-2xx status.
    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
