pub mod auth;
pub mod client;
pub mod consent;
pub mod error;
pub mod oauth;
pub mod secrets;
pub mod token;
pub mod writer;

pub use auth::{Authenticator, CredentialState};
pub use client::{SheetsClient, UpdateValuesResponse};
pub use consent::{ConsentFlow, LoopbackConsent};
pub use error::{AuthError, SheetsError};
pub use oauth::TokenClient;
pub use secrets::ClientSecrets;
pub use token::{StoredToken, TokenStore};
pub use writer::SheetWriter;

/// Read/write access to spreadsheets.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
