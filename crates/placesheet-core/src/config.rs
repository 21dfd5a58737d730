use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub(crate) const DEFAULT_SEARCH_URL: &str =
    "https://www.google.com/maps/search/autoescuelas+barcelona";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is set to a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let sheet_id = lookup("GOOGLE_SHEET_ID").ok();
    let search_url = or_default("PLACESHEET_SEARCH_URL", DEFAULT_SEARCH_URL);
    let result_limit = parse_usize("PLACESHEET_RESULT_LIMIT", "15")?;
    let sheet_range = or_default("PLACESHEET_SHEET_RANGE", "A1");
    let wait_timeout_ms = parse_u64("PLACESHEET_WAIT_TIMEOUT_MS", "10000")?;
    let poll_interval_ms = parse_u64("PLACESHEET_POLL_INTERVAL_MS", "250")?;
    let headless = parse_bool("PLACESHEET_HEADLESS", &or_default("PLACESHEET_HEADLESS", "true"))?;
    let chrome_path = lookup("PLACESHEET_CHROME_PATH").ok().map(PathBuf::from);
    let client_secrets_path =
        PathBuf::from(or_default("PLACESHEET_CLIENT_SECRETS_PATH", "credentials.json"));
    let token_path = PathBuf::from(or_default("PLACESHEET_TOKEN_PATH", "token.json"));
    let http_timeout_secs = parse_u64("PLACESHEET_HTTP_TIMEOUT_SECS", "30")?;
    let log_level = or_default("PLACESHEET_LOG_LEVEL", "info");

    Ok(AppConfig {
        sheet_id,
        search_url,
        result_limit,
        sheet_range,
        wait_timeout_ms,
        poll_interval_ms,
        headless,
        chrome_path,
        client_secrets_path,
        token_path,
        http_timeout_secs,
        log_level,
    })
}

/// Parse a boolean flag. Accepts `true/false`, `1/0`, `yes/no` in any case.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
