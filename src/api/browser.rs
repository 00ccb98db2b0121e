mod chromium;

use std::{
    fmt::{Display, Formatter},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::{Instant, sleep};

pub use self::chromium::Chromium;
use crate::prelude::*;

/// Interval between the page condition checks.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Page element locator.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Locator {
    Id(&'static str),
    Css(&'static str),
}

impl Locator {
    #[must_use]
    pub fn to_css(self) -> String {
        match self {
            Self::Id(id) => format!("#{id}"),
            Self::Css(selector) => selector.to_owned(),
        }
    }
}

impl Display for Locator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id `{id}`"),
            Self::Css(selector) => write!(f, "selector `{selector}`"),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BrowserError {
    #[display("{locator} did not appear within {timeout:?}")]
    Timeout { locator: Locator, timeout: Duration },

    #[display("{locator} is not found on the page")]
    ElementNotFound { locator: Locator },
}

/// Headless browser automation capability.
#[async_trait]
pub trait Browser: Send {
    async fn navigate(&mut self, url: &str) -> Result;

    async fn is_present(&mut self, locator: Locator) -> Result<bool>;

    /// Fails with [`BrowserError::ElementNotFound`] when the element is absent.
    async fn click(&mut self, locator: Locator) -> Result;

    /// Fails with [`BrowserError::ElementNotFound`] when the element is absent.
    async fn type_text(&mut self, locator: Locator, text: &str) -> Result;

    /// Text content of the element.
    ///
    /// Fails with [`BrowserError::ElementNotFound`] when the element is absent.
    async fn read_text(&mut self, locator: Locator) -> Result<String>;

    /// Evaluate the JavaScript expression in the page context.
    async fn execute_script(&mut self, script: &str) -> Result<Value>;

    async fn close(&mut self) -> Result;

    /// Poll the page until the element appears.
    ///
    /// Fails with [`BrowserError::Timeout`] when it does not appear in time.
    #[instrument(skip_all, fields(locator = %locator))]
    async fn wait_for(&mut self, locator: Locator, timeout: Duration) -> Result {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_present(locator).await? {
                debug!("appeared");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout { locator, timeout }.into());
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Read the local storage item, `None` when it is absent or empty.
    async fn read_local_storage(&mut self, key: &str) -> Result<Option<String>> {
        let script = format!("window.localStorage.getItem({}) ?? ''", serde_json::to_string(key)?);
        let value = self.execute_script(&script).await?;
        Ok(value.as_str().filter(|value| !value.is_empty()).map(str::to_owned))
    }

    /// Poll the local storage until the item appears.
    #[instrument(skip_all, fields(key = key))]
    async fn wait_for_local_storage(
        &mut self,
        key: &str,
        timeout: Duration,
    ) -> Result<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = self.read_local_storage(key).await? {
                return Ok(Some(value));
            }
            if Instant::now() >= deadline {
                warn!(?timeout, "local storage item did not appear");
                return Ok(None);
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}
