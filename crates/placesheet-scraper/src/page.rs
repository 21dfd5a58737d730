//! The browser seam the collector drives.
//!
//! [`MapPage`] is implemented by [`crate::ChromePage`] for real runs and by
//! in-memory fakes in tests. Single-field reads are expected to apply their
//! own bounded wait; list reads (`table`, `attributes`) read whatever is in
//! the document right now.

use crate::error::ScraperError;
use crate::field::Field;

#[allow(async_fn_in_trait)]
pub trait MapPage {
    /// Handle to one result card.
    type Entry;

    /// Navigates to the results page.
    async fn open(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Waits (bounded) for any element matching `selector`. Returns `false`
    /// on timeout.
    async fn wait_for(&self, selector: &str) -> bool;

    /// Returns every element matching `selector`, in document order.
    async fn entries(&self, selector: &str) -> Result<Vec<Self::Entry>, ScraperError>;

    /// Opens the detail pane for `entry`.
    async fn select(&self, entry: &Self::Entry) -> Result<(), ScraperError>;

    /// Waits (bounded) until the text at `selector` exists and differs from
    /// `previous`. Returns `false` on timeout.
    async fn wait_for_text_change(&self, selector: &str, previous: Option<&str>) -> bool;

    async fn text(&self, selector: &str) -> Field<String>;

    async fn attribute(&self, selector: &str, name: &str) -> Field<String>;

    /// Reads a two-column table: for each `row` element, the text of its
    /// `key` and `value` children.
    async fn table(&self, row: &str, key: &str, value: &str) -> Field<Vec<(String, String)>>;

    /// Reads attribute `name` from every element matching `selector`.
    /// Elements without the attribute are skipped.
    async fn attributes(&self, selector: &str, name: &str) -> Field<Vec<String>>;
}
