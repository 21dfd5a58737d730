//! CSS selectors for the map search results page and its detail pane.
//!
//! Update these when the results page markup changes.

/// Result card in the results feed.
pub const RESULT_ENTRY: &str = "div[role=\"article\"]";

/// Detail pane fields.
pub mod detail {
    pub const NAME: &str = ".fontHeadlineSmall";
    pub const RATING: &str = "span[role=\"img\"]";
    pub const RATING_ATTR: &str = "aria-label";
    pub const REVIEWS: &str = "button[aria-label*=\"reseñas\"]";
    pub const ADDRESS: &str = "button[data-item-id*=\"address\"]";
    pub const PHONE: &str = "button[data-item-id*=\"phone\"]";
    pub const WEBSITE: &str = "a[data-item-id*=\"website\"]";
    pub const WEBSITE_ATTR: &str = "href";
    pub const HOURS_ROW: &str = "tbody tr";
    pub const HOURS_DAY: &str = "th";
    pub const HOURS_VALUE: &str = "td";
    /// Photos hosted on the listing image CDN.
    pub const IMAGE: &str = "img[src*=\"googleusercontent\"]";
    pub const IMAGE_ATTR: &str = "src";
}

/// Full selector set used by the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    pub result_entry: String,
    pub name: String,
    pub rating: String,
    pub rating_attr: String,
    pub reviews: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub website_attr: String,
    pub hours_row: String,
    pub hours_day: String,
    pub hours_value: String,
    pub image: String,
    pub image_attr: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            result_entry: RESULT_ENTRY.to_owned(),
            name: detail::NAME.to_owned(),
            rating: detail::RATING.to_owned(),
            rating_attr: detail::RATING_ATTR.to_owned(),
            reviews: detail::REVIEWS.to_owned(),
            address: detail::ADDRESS.to_owned(),
            phone: detail::PHONE.to_owned(),
            website: detail::WEBSITE.to_owned(),
            website_attr: detail::WEBSITE_ATTR.to_owned(),
            hours_row: detail::HOURS_ROW.to_owned(),
            hours_day: detail::HOURS_DAY.to_owned(),
            hours_value: detail::HOURS_VALUE.to_owned(),
            image: detail::IMAGE.to_owned(),
            image_attr: detail::IMAGE_ATTR.to_owned(),
        }
    }
}
