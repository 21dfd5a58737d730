//! Outcome of a single best-effort field read.
//!
//! A miss is an expected outcome, not an error: the collector turns it into an
//! absent value. The reason is kept so callers can log it.

use thiserror::Error;

/// Result of reading one field from the detail pane.
pub type Field<T> = Result<T, FieldMiss>;

/// Why a field read produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissReason {
    /// No element matched before the bounded wait expired.
    #[error("no match before timeout")]
    Timeout,

    /// The element matched but carried no text or attribute value.
    #[error("element has no value")]
    NoValue,

    /// The browser reported an error while reading.
    #[error("driver error: {0}")]
    Driver(String),
}

/// A field read that produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{selector}: {reason}")]
pub struct FieldMiss {
    pub selector: String,
    pub reason: MissReason,
}

impl FieldMiss {
    #[must_use]
    pub fn new(selector: &str, reason: MissReason) -> Self {
        Self {
            selector: selector.to_owned(),
            reason,
        }
    }

    #[must_use]
    pub fn timeout(selector: &str) -> Self {
        Self::new(selector, MissReason::Timeout)
    }

    #[must_use]
    pub fn no_value(selector: &str) -> Self {
        Self::new(selector, MissReason::NoValue)
    }

    pub fn driver(selector: &str, err: impl std::fmt::Display) -> Self {
        Self::new(selector, MissReason::Driver(err.to_string()))
    }
}
