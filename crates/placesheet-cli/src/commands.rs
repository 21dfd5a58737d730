//! Command handlers for the CLI.
//!
//! Each handler receives the loaded [`AppConfig`] and its parsed arguments.
//! Flags override the corresponding environment setting.

use placesheet_core::{AppConfig, Record};
use placesheet_scraper::{collect_with_chrome, ChromeOptions, Collector, WaitPolicy};
use placesheet_sheets::{
    Authenticator, LoopbackConsent, SheetWriter, SheetsClient, TokenClient, TokenStore,
    SPREADSHEETS_SCOPE,
};

use crate::{CollectArgs, RunArgs};

/// Collect listings, close the browser, then write them to the sheet.
///
/// Nothing is written when no listing was collected. A failed write is logged
/// by the writer and does not make the command fail.
///
/// # Errors
///
/// Returns an error if the browser cannot be launched, the results page cannot
/// be opened, or the HTTP clients cannot be constructed.
pub(crate) async fn run_pipeline(config: &AppConfig, args: &RunArgs) -> anyhow::Result<()> {
    let records = collect_records(config, &args.collect).await?;
    if records.is_empty() {
        tracing::warn!("no listings collected; sheet left untouched");
        return Ok(());
    }

    let (sheet_id, range) = write_target(config, args);
    if sheet_id.is_empty() {
        tracing::warn!("GOOGLE_SHEET_ID is not set; the update will be rejected");
    }

    let sheets = SheetsClient::new(config.http_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build Sheets client: {e}"))?;
    let writer = SheetWriter::new(authenticator(config)?, sheets);
    writer.write(&records, sheet_id, range).await;
    Ok(())
}

/// Collect listings and print them to stdout as pretty JSON.
///
/// # Errors
///
/// Returns an error if collection fails or the records cannot be serialised.
pub(crate) async fn run_collect(config: &AppConfig, args: &CollectArgs) -> anyhow::Result<()> {
    let records = collect_records(config, args).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Drive the credential state machine without collecting anything.
///
/// # Errors
///
/// Returns an error if no valid credential can be obtained or stored.
pub(crate) async fn run_auth(config: &AppConfig) -> anyhow::Result<()> {
    let token = authenticator(config)?.credential().await?;
    let expiry = token
        .expiry
        .map_or_else(|| "never".to_owned(), |e| e.to_rfc3339());
    println!(
        "credential ready at {} (expires {expiry})",
        config.token_path.display()
    );
    Ok(())
}

async fn collect_records(config: &AppConfig, args: &CollectArgs) -> anyhow::Result<Vec<Record>> {
    let url = args.url.as_deref().unwrap_or(&config.search_url);
    let limit = args.limit.unwrap_or(config.result_limit);
    tracing::info!(url, limit, "collecting listings");

    let records =
        collect_with_chrome(&chrome_options(config), &Collector::default(), url, limit).await?;
    tracing::info!(count = records.len(), "collection finished");
    Ok(records)
}

pub(crate) fn chrome_options(config: &AppConfig) -> ChromeOptions {
    ChromeOptions {
        headless: config.headless,
        chrome_path: config.chrome_path.clone(),
        wait: WaitPolicy::from_millis(config.wait_timeout_ms, config.poll_interval_ms),
    }
}

/// Spreadsheet id and range, flags first. A missing id is passed on as empty.
pub(crate) fn write_target<'a>(config: &'a AppConfig, args: &'a RunArgs) -> (&'a str, &'a str) {
    let sheet_id = args
        .sheet_id
        .as_deref()
        .or(config.sheet_id.as_deref())
        .unwrap_or_default();
    let range = args.range.as_deref().unwrap_or(&config.sheet_range);
    (sheet_id, range)
}

fn authenticator(config: &AppConfig) -> anyhow::Result<Authenticator<LoopbackConsent>> {
    let tokens = TokenClient::new(config.http_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build token client: {e}"))?;
    Ok(Authenticator::new(
        TokenStore::new(config.token_path.clone()),
        config.client_secrets_path.clone(),
        vec![SPREADSHEETS_SCOPE.to_owned()],
        tokens,
        LoopbackConsent::default(),
    ))
}
