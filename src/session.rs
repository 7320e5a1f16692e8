//! Single headless browser session for running audits
//!
//! One session, one caller: the tool launches a Chrome instance, polls its
//! DevTools Protocol event stream on a background task, and opens pages on
//! demand. No pooling or restart logic; a dead session is reported, not
//! recovered.

use crate::config::{create_browser_config, Config};
use crate::error::AxeError;
use crate::utils::validate_url;
use chromiumoxide::browser::Browser;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tracing::{error, info};

pub struct BrowserSession {
    browser: Browser,
    handler: tokio::task::JoinHandle<Result<(), chromiumoxide::error::CdpError>>,
}

impl BrowserSession {
    /// Launch a headless Chrome instance configured for auditing.
    pub async fn launch(config: &Config) -> Result<Self, AxeError> {
        let browser_config = create_browser_config(config)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AxeError::BrowserLaunchFailed(e.to_string()))?;

        // The handler implements Stream and must be polled with .next().await
        // in a loop for the browser connection to make progress.
        let handler_task = tokio::spawn(async move {
            loop {
                match handler.next().await {
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        error!("CDP handler error: {}", e);
                        return Err(e);
                    }
                    None => {
                        // Stream ended, browser probably closed
                        info!("CDP handler stream ended");
                        break;
                    }
                }
            }
            Ok(())
        });

        info!("Browser session launched");
        Ok(Self {
            browser,
            handler: handler_task,
        })
    }

    /// Navigate a new page to `url` and wait for it to load.
    pub async fn open(&self, url: &str) -> Result<Page, AxeError> {
        let url = validate_url(url)?;

        let page = self
            .browser
            .new_page(url.as_str())
            .await
            .map_err(|e| AxeError::PageError(e.to_string()))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| AxeError::PageError(e.to_string()))?;

        Ok(page)
    }

    /// All pages currently open in this browser.
    pub async fn pages(&self) -> Result<Vec<Page>, AxeError> {
        self.browser
            .pages()
            .await
            .map_err(|e| AxeError::PageError(e.to_string()))
    }

    /// Close the browser and stop the handler task.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            error!("Failed to close browser cleanly: {}", e);
        }
        self.handler.abort();
        info!("Browser session shut down");
    }
}
