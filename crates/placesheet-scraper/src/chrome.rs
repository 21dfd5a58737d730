//! [`MapPage`] backed by a Chrome instance driven over the DevTools protocol.

use std::path::PathBuf;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use placesheet_core::Record;
use tokio::task::JoinHandle;

use crate::collector::Collector;
use crate::error::ScraperError;
use crate::field::{Field, FieldMiss};
use crate::page::MapPage;
use crate::wait::{wait_until, WaitPolicy};

/// Launch settings for [`ChromePage`].
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    /// Chrome executable; auto-detected when `None`.
    pub chrome_path: Option<PathBuf>,
    pub wait: WaitPolicy,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            wait: WaitPolicy::default(),
        }
    }
}

/// A single Chrome tab plus the browser process that owns it.
///
/// Call [`ChromePage::close`] when done; the CDP handler task is aborted
/// there.
pub struct ChromePage {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    wait: WaitPolicy,
}

impl ChromePage {
    /// Launches Chrome with sandboxing and `/dev/shm` usage disabled so it
    /// runs inside containers.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Launch`] if the configuration is rejected, or
    /// [`ScraperError::Browser`] if the process cannot be started.
    pub async fn launch(options: &ChromeOptions) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage");
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &options.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::Launch)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler event error");
                }
            }
        });

        tracing::info!(headless = options.headless, "browser launched");
        Ok(Self {
            browser,
            page: None,
            handler_task,
            wait: options.wait,
        })
    }

    /// Closes the browser and stops the CDP handler task.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Browser`] if the close command fails. The
    /// handler task is stopped either way.
    pub async fn close(mut self) -> Result<(), ScraperError> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            tracing::debug!(error = %e, "waiting for browser process failed");
        }
        self.handler_task.abort();
        closed?;
        tracing::info!("browser closed");
        Ok(())
    }

    fn page(&self) -> Result<&Page, ScraperError> {
        self.page.as_ref().ok_or(ScraperError::NoPage)
    }

    async fn await_element(&self, selector: &str) -> Field<Element> {
        let page = self.page().map_err(|e| FieldMiss::driver(selector, e))?;
        wait_until(self.wait, || async move { page.find_element(selector).await.ok() })
            .await
            .ok_or_else(|| FieldMiss::timeout(selector))
    }
}

impl MapPage for ChromePage {
    type Entry = Element;

    async fn open(&mut self, url: &str) -> Result<(), ScraperError> {
        tracing::info!(url, "opening results page");
        let page = self.browser.new_page(url).await?;
        self.page = Some(page);
        Ok(())
    }

    async fn wait_for(&self, selector: &str) -> bool {
        self.await_element(selector).await.is_ok()
    }

    async fn entries(&self, selector: &str) -> Result<Vec<Element>, ScraperError> {
        Ok(self.page()?.find_elements(selector).await?)
    }

    async fn select(&self, entry: &Element) -> Result<(), ScraperError> {
        entry
            .click()
            .await
            .map(|_| ())
            .map_err(|e| ScraperError::Selection(e.to_string()))
    }

    async fn wait_for_text_change(&self, selector: &str, previous: Option<&str>) -> bool {
        let Ok(page) = self.page() else {
            return false;
        };
        wait_until(self.wait, || async move {
            let element = page.find_element(selector).await.ok()?;
            let text = element.inner_text().await.ok()??;
            (previous != Some(text.as_str())).then_some(())
        })
        .await
        .is_some()
    }

    async fn text(&self, selector: &str) -> Field<String> {
        let element = self.await_element(selector).await?;
        element
            .inner_text()
            .await
            .map_err(|e| FieldMiss::driver(selector, e))?
            .ok_or_else(|| FieldMiss::no_value(selector))
    }

    async fn attribute(&self, selector: &str, name: &str) -> Field<String> {
        let element = self.await_element(selector).await?;
        element
            .attribute(name)
            .await
            .map_err(|e| FieldMiss::driver(selector, e))?
            .ok_or_else(|| FieldMiss::no_value(selector))
    }

    async fn table(&self, row: &str, key: &str, value: &str) -> Field<Vec<(String, String)>> {
        let page = self.page().map_err(|e| FieldMiss::driver(row, e))?;
        let rows = page
            .find_elements(row)
            .await
            .map_err(|e| FieldMiss::driver(row, e))?;

        let mut out = Vec::with_capacity(rows.len());
        for element in rows {
            let day = cell_text(&element, key).await?;
            let hours = cell_text(&element, value).await?;
            out.push((day, hours));
        }
        Ok(out)
    }

    async fn attributes(&self, selector: &str, name: &str) -> Field<Vec<String>> {
        let page = self.page().map_err(|e| FieldMiss::driver(selector, e))?;
        let elements = page
            .find_elements(selector)
            .await
            .map_err(|e| FieldMiss::driver(selector, e))?;

        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match element.attribute(name).await {
                Ok(Some(v)) => values.push(v),
                Ok(None) => {}
                Err(e) => return Err(FieldMiss::driver(selector, e)),
            }
        }
        Ok(values)
    }
}

async fn cell_text(row: &Element, selector: &str) -> Field<String> {
    let cell = row
        .find_element(selector)
        .await
        .map_err(|e| FieldMiss::driver(selector, e))?;
    Ok(cell
        .inner_text()
        .await
        .map_err(|e| FieldMiss::driver(selector, e))?
        .unwrap_or_default())
}

/// Launches Chrome, collects up to `limit` records from `url`, and closes the
/// browser on both the success and the failure path.
///
/// # Errors
///
/// Returns [`ScraperError`] if the browser cannot be launched or the results
/// page cannot be opened or listed.
pub async fn collect_with_chrome(
    options: &ChromeOptions,
    collector: &Collector,
    url: &str,
    limit: usize,
) -> Result<Vec<Record>, ScraperError> {
    let mut page = ChromePage::launch(options).await?;
    let collected = collector.collect(&mut page, url, limit).await;
    if let Err(e) = page.close().await {
        tracing::warn!(error = %e, "failed to close browser cleanly");
    }
    collected
}
