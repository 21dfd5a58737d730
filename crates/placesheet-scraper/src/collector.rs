//! Walks the result cards of a search page and reads one [`Record`] per card.
//!
//! Field reads are isolated: a miss on one field leaves that field absent and
//! the rest of the record intact. A card that cannot be selected at all is
//! logged and skipped.

use placesheet_core::{Hours, Record};

use crate::error::ScraperError;
use crate::field::Field;
use crate::page::MapPage;
use crate::selectors::Selectors;

#[derive(Debug, Clone, Default)]
pub struct Collector {
    selectors: Selectors,
}

impl Collector {
    #[must_use]
    pub fn new(selectors: Selectors) -> Self {
        Self { selectors }
    }

    #[must_use]
    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    /// Opens `url` and reads up to `limit` result cards.
    ///
    /// The returned list has at most `min(limit, cards on page)` records, in
    /// card order. Cards whose selection fails are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the page cannot be opened or the result
    /// cards cannot be listed. Per-card failures are logged, not returned.
    pub async fn collect<P: MapPage>(
        &self,
        page: &mut P,
        url: &str,
        limit: usize,
    ) -> Result<Vec<Record>, ScraperError> {
        page.open(url).await?;

        if !page.wait_for(&self.selectors.result_entry).await {
            tracing::warn!(url, "no result entries appeared before timeout");
        }

        let mut entries = page.entries(&self.selectors.result_entry).await?;
        let found = entries.len();
        entries.truncate(limit);
        tracing::info!(found, limit, selected = entries.len(), "collecting result entries");

        let mut records = Vec::with_capacity(entries.len());
        let mut previous_name: Option<String> = None;

        for (index, entry) in entries.iter().enumerate() {
            match self
                .extract_record(page, entry, previous_name.as_deref())
                .await
            {
                Ok(record) => {
                    tracing::debug!(index, name = ?record.name, "extracted record");
                    previous_name.clone_from(&record.name);
                    records.push(record);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping result entry");
                }
            }
        }

        tracing::info!(records = records.len(), "collection finished");
        Ok(records)
    }

    /// Selects `entry` and reads every field of its detail pane.
    ///
    /// `previous_name` is the headline of the pane shown before this
    /// selection; the read waits (bounded) for the headline to change so a
    /// stale pane is not read twice.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] only if the entry cannot be selected.
    pub async fn extract_record<P: MapPage>(
        &self,
        page: &P,
        entry: &P::Entry,
        previous_name: Option<&str>,
    ) -> Result<Record, ScraperError> {
        let s = &self.selectors;

        page.select(entry).await?;
        if !page.wait_for_text_change(&s.name, previous_name).await {
            tracing::debug!(previous = ?previous_name, "detail pane headline did not change");
        }

        let name = present("name", page.text(&s.name).await);
        let rating = present("rating", page.attribute(&s.rating, &s.rating_attr).await);
        let reviews = present("reviews", page.text(&s.reviews).await);
        let address = present("address", page.text(&s.address).await);
        let phone = present("phone", page.text(&s.phone).await);
        let website = present("website", page.attribute(&s.website, &s.website_attr).await);

        let hours = present(
            "hours",
            page.table(&s.hours_row, &s.hours_day, &s.hours_value).await,
        )
        .map(|rows| rows.into_iter().collect::<Hours>())
        .unwrap_or_default();

        let images = present("images", page.attributes(&s.image, &s.image_attr).await)
            .unwrap_or_default();

        Ok(Record {
            name,
            rating,
            reviews,
            address,
            phone,
            website,
            hours,
            images,
        })
    }
}

fn present<T>(field: &'static str, read: Field<T>) -> Option<T> {
    match read {
        Ok(value) => Some(value),
        Err(miss) => {
            tracing::debug!(field, selector = %miss.selector, reason = %miss.reason, "field miss");
            None
        }
    }
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
