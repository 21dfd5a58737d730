//! Authenticate, build the grid, and write it in one call.

use placesheet_core::{records_to_grid, Record};

use crate::auth::Authenticator;
use crate::client::{SheetsClient, UpdateValuesResponse};
use crate::consent::ConsentFlow;
use crate::error::SheetsError;

pub struct SheetWriter<C> {
    auth: Authenticator<C>,
    sheets: SheetsClient,
}

impl<C: ConsentFlow> SheetWriter<C> {
    pub fn new(auth: Authenticator<C>, sheets: SheetsClient) -> Self {
        Self { auth, sheets }
    }

    /// Writes `records` to `range` and logs the outcome.
    ///
    /// Failures (authentication, network, API) are logged at error level and
    /// never returned.
    pub async fn write(&self, records: &[Record], sheet_id: &str, range: &str) {
        match self.try_write(records, sheet_id, range).await {
            Ok(response) => tracing::info!(
                updated_range = %response.updated_range,
                updated_cells = response.updated_cells,
                at = %chrono::Local::now().to_rfc3339(),
                "sheet updated"
            ),
            Err(e) => tracing::error!(error = %e, range, "failed to update sheet"),
        }
    }

    /// Same as [`SheetWriter::write`] but returns the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Auth`] if no credential can be obtained, or any
    /// error from [`SheetsClient::update_values`].
    pub async fn try_write(
        &self,
        records: &[Record],
        sheet_id: &str,
        range: &str,
    ) -> Result<UpdateValuesResponse, SheetsError> {
        let token = self.auth.credential().await?;
        let grid = records_to_grid(records);
        tracing::info!(rows = grid.len(), range, "writing grid");
        self.sheets
            .update_values(&token.token, sheet_id, range, &grid)
            .await
    }
}
