use async_trait::async_trait;
use chromiumoxide::{Element, Page, browser::BrowserConfig};
use futures_util::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{
    api::browser::{Browser, BrowserError, Locator},
    prelude::*,
};

/// Headless Chromium driven over the DevTools protocol.
pub struct Chromium {
    browser: chromiumoxide::Browser,
    handler_task: JoinHandle<()>,
    page: Page,
}

impl Chromium {
    /// Launch an isolated headless browser with a blank page.
    #[instrument(skip_all)]
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .incognito()
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .build()
            .map_err(Error::msg)
            .context("failed to configure the browser")?;
        let (browser, mut handler) = chromiumoxide::Browser::launch(config)
            .await
            .context("failed to launch the browser, is Chrome or Chromium installed?")?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(error) => {
                handler_task.abort();
                return Err(error).context("failed to open a new page");
            }
        };
        info!("launched");
        Ok(Self { browser, handler_task, page })
    }

    async fn find_first(&self, locator: Locator) -> Result<Option<Element>> {
        let elements = self
            .page
            .find_elements(locator.to_css())
            .await
            .with_context(|| format!("failed to look up {locator}"))?;
        Ok(elements.into_iter().next())
    }

    async fn find(&self, locator: Locator) -> Result<Element> {
        Ok(self.find_first(locator).await?.ok_or(BrowserError::ElementNotFound { locator })?)
    }
}

impl Drop for Chromium {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl Browser for Chromium {
    #[instrument(skip_all, fields(url = url))]
    async fn navigate(&mut self, url: &str) -> Result {
        info!("navigating…");
        self.page.goto(url).await.with_context(|| format!("failed to navigate to `{url}`"))?;
        Ok(())
    }

    async fn is_present(&mut self, locator: Locator) -> Result<bool> {
        Ok(self.find_first(locator).await?.is_some())
    }

    async fn click(&mut self, locator: Locator) -> Result {
        self.find(locator)
            .await?
            .click()
            .await
            .with_context(|| format!("failed to click {locator}"))?;
        Ok(())
    }

    async fn type_text(&mut self, locator: Locator, text: &str) -> Result {
        self.find(locator)
            .await?
            .type_str(text)
            .await
            .with_context(|| format!("failed to type into {locator}"))?;
        Ok(())
    }

    async fn read_text(&mut self, locator: Locator) -> Result<String> {
        let text = self
            .find(locator)
            .await?
            .inner_text()
            .await
            .with_context(|| format!("failed to read {locator}"))?;
        Ok(text.unwrap_or_default())
    }

    async fn execute_script(&mut self, script: &str) -> Result<Value> {
        let value = self
            .page
            .evaluate(script)
            .await
            .context("failed to evaluate the script")?
            .into_value::<Value>()
            .context("failed to deserialize the script result")?;
        Ok(value)
    }

    #[instrument(skip_all)]
    async fn close(&mut self) -> Result {
        self.browser.close().await.context("failed to close the browser")?;
        self.browser.wait().await.context("failed to wait for the browser to exit")?;
        self.handler_task.abort();
        info!("closed");
        Ok(())
    }
}
