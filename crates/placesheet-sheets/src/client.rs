//! HTTP client for the Sheets v4 `values.update` endpoint.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;

use crate::error::SheetsError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/";

/// Response body of `values.update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateValuesResponse {
    pub spreadsheet_id: String,
    pub updated_range: String,
    pub updated_rows: u64,
    pub updated_columns: u64,
    pub updated_cells: u64,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for the Sheets REST API.
///
/// Use [`SheetsClient::new`] for production or [`SheetsClient::with_base_url`]
/// to point at a mock server in tests.
pub struct SheetsClient {
    client: Client,
    base_url: Url,
}

impl SheetsClient {
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, SheetsError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`SheetsError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("placesheet/0.1")
            .build()?;

        // Keep exactly one trailing slash so path segments append below the base.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| SheetsError::InvalidBaseUrl(base_url.to_owned()))?;

        Ok(Self { client, base_url })
    }

    /// Overwrites `range` of `spreadsheet_id` with `values`, as literal text.
    ///
    /// # Errors
    ///
    /// - [`SheetsError::Api`] on a non-2xx response.
    /// - [`SheetsError::Http`] on network failure.
    /// - [`SheetsError::Deserialize`] if the success body does not parse.
    pub async fn update_values(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
        range: &str,
        values: &[Vec<String>],
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let url = self.values_url(spreadsheet_id, range)?;
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": values,
        });

        let response = self
            .client
            .put(url.clone())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| SheetsError::Deserialize {
            context: format!("values.update({spreadsheet_id}, {range})"),
            source: e,
        })
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}?valueInputOption=RAW`, with
    /// the id and range percent-encoded as single path segments.
    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SheetsError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }
}
