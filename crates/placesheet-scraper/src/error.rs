use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("invalid browser configuration: {0}")]
    Launch(String),

    #[error("no page is open")]
    NoPage,

    #[error("could not select result entry: {0}")]
    Selection(String),
}
