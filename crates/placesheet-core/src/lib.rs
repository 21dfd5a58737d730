mod app_config;
mod config;
pub mod grid;
pub mod record;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use grid::{build_grid, records_to_grid, render_cell, Row};
pub use record::{Hours, Record, FIELD_NAMES};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
