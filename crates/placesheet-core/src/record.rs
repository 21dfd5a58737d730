//! Listing records produced by the collector.
//!
//! A [`Record`] always carries every field. Extraction is best-effort, so any
//! scalar may be `None`, and `hours`/`images` may be empty, but no key is ever
//! dropped from the serialised form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grid::Row;

/// Column names in the order they are serialised and written to the sheet.
pub const FIELD_NAMES: [&str; 8] = [
    "name", "rating", "reviews", "address", "phone", "website", "hours", "images",
];

/// One business listing read from a detail pane.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Headline of the detail pane.
    pub name: Option<String>,
    /// Accessible label of the star widget, e.g. `"4,6 estrellas"`.
    pub rating: Option<String>,
    /// Text of the review-count button, e.g. `"(312)"`.
    pub reviews: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub hours: Hours,
    /// Photo URLs in document order. Duplicates are kept.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Record {
    /// Converts the record into an ordered row keyed by [`FIELD_NAMES`].
    ///
    /// Absent scalars become JSON `null` rather than missing keys.
    #[must_use]
    pub fn to_row(&self) -> Row {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            // Serialising a struct of strings, vectors, and string maps cannot fail.
            _ => Row::new(),
        }
    }
}

/// Opening hours keyed by day label, in the order the days were read.
///
/// Behaves as a mapping: inserting a day that is already present replaces its
/// hours in place instead of appending a second entry. Backed by an
/// insertion-ordered JSON object, so it serialises as `{"day": "hours", ..}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hours(serde_json::Map<String, Value>);

impl Hours {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, day: impl Into<String>, hours: impl Into<String>) {
        self.0.insert(day.into(), Value::String(hours.into()));
    }

    #[must_use]
    pub fn get(&self, day: &str) -> Option<&str> {
        self.0.get(day).and_then(Value::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Days and their hours in read order. Non-string values read back from
    /// JSON yield an empty hours label.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(day, hours)| (day.as_str(), hours.as_str().unwrap_or_default()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Hours {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut hours = Hours::new();
        for (day, value) in iter {
            hours.insert(day, value);
        }
        hours
    }
}
