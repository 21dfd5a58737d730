pub mod chrome;
pub mod collector;
pub mod error;
pub mod field;
pub mod page;
pub mod selectors;
pub mod wait;

pub use chrome::{collect_with_chrome, ChromeOptions, ChromePage};
pub use collector::Collector;
pub use error::ScraperError;
pub use field::{Field, FieldMiss, MissReason};
pub use page::MapPage;
pub use selectors::Selectors;
pub use wait::{wait_until, WaitPolicy};
