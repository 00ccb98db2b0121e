//! Browser-driven login which yields the myenergy session token.

use std::{
    fmt::{Debug, Formatter},
    time::Duration,
};

use bon::Builder;
use tokio::time::sleep;

use crate::{
    api::browser::{Browser, BrowserError, Locator},
    prelude::*,
};

/// Provider-specific pages, elements, and storage keys.
pub struct Portal {
    pub login_url: &'static str,

    /// Contains an `{account_id}` placeholder.
    pub account_page_url: &'static str,

    pub username_field: Locator,
    pub next_button: Locator,
    pub password_field: Locator,
    pub submit_button: Locator,

    /// Only appears after a successful login.
    pub account_number: Locator,

    /// Local storage key which the account page populates with the token.
    pub token_key: &'static str,
}

impl Portal {
    pub const BRITISH_GAS: Self = Self {
        login_url: "https://www.britishgas.co.uk/identity/",
        account_page_url: "https://www.britishgas.co.uk/smartreport?accounts={account_id}",
        username_field: Locator::Id("loginForm-email"),
        next_button: Locator::Id("loginForm-next"),
        password_field: Locator::Id("loginForm-password"),
        submit_button: Locator::Id("loginForm-submit"),
        account_number: Locator::Css(".account-number"),
        token_key: "myenergy.token",
    };

    #[must_use]
    pub fn account_page_url(&self, account_id: &str) -> String {
        self.account_page_url.replace("{account_id}", account_id)
    }
}

#[derive(Copy, Clone, Builder)]
pub struct Timeouts {
    /// Maximum wait for a page element to appear.
    #[builder(default = Duration::from_secs(20))]
    pub element: Duration,

    /// Maximum wait for the token to appear in the local storage.
    #[builder(default = Duration::from_secs(20))]
    pub token: Duration,

    /// Pause before closing the browser.
    #[builder(default = Duration::from_secs(2))]
    pub settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials").field("username", &self.username).finish_non_exhaustive()
    }
}

#[must_use]
pub struct Session {
    pub account_id: String,

    /// Opaque bearer token for the GraphQL service, valid for this run only.
    pub token: String,
}

impl Session {
    pub fn new(account_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self { account_id: account_id.into(), token: token.into() }
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("account_id", &self.account_id).finish_non_exhaustive()
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoginError {
    #[display("authentication failed: {reason}")]
    Authentication { reason: &'static str },
}

/// Log in and pick up the session token.
///
/// The browser gets closed regardless of the outcome.
#[instrument(skip_all, fields(username = %credentials.username))]
pub async fn acquire_session<B: Browser + ?Sized>(
    browser: &mut B,
    portal: &Portal,
    credentials: &Credentials,
    timeouts: Timeouts,
) -> Result<Session> {
    let result = log_in(browser, portal, credentials, timeouts).await;
    if let Err(error) = browser.close().await {
        warn!("failed to close the browser: {error:#}");
    }
    result
}

async fn log_in<B: Browser + ?Sized>(
    browser: &mut B,
    portal: &Portal,
    credentials: &Credentials,
    timeouts: Timeouts,
) -> Result<Session> {
    info!("visiting the login page…");
    browser.navigate(portal.login_url).await?;
    wait_optimistically(browser, portal.username_field, timeouts.element).await?;
    browser.click(portal.username_field).await?;
    browser.type_text(portal.username_field, &credentials.username).await?;
    browser.click(portal.next_button).await?;

    info!("logging in…");
    wait_optimistically(browser, portal.password_field, timeouts.element).await?;
    browser.click(portal.password_field).await?;
    browser.type_text(portal.password_field, &credentials.password).await?;
    browser.click(portal.submit_button).await?;

    info!("fetching the account number…");
    if !wait_optimistically(browser, portal.account_number, timeouts.element).await?
        && browser.is_present(portal.password_field).await?
    {
        return Err(LoginError::Authentication { reason: "the login form was rejected" }.into());
    }
    let account_id = browser.read_text(portal.account_number).await?.trim().to_owned();
    if account_id.is_empty() {
        return Err(LoginError::Authentication { reason: "the account number is empty" }.into());
    }
    info!(%account_id, "logged in");

    // Visiting the account page puts the token into the local storage:
    browser.navigate(&portal.account_page_url(&account_id)).await?;
    let Some(token) = browser.wait_for_local_storage(portal.token_key, timeouts.token).await?
    else {
        return Err(LoginError::Authentication { reason: "no session token was issued" }.into());
    };
    let token = token.trim_matches('"');
    ensure!(!token.is_empty(), LoginError::Authentication { reason: "the session token is empty" });
    info!(token_length = token.len(), "fetched the session token");

    if !timeouts.settle.is_zero() {
        sleep(timeouts.settle).await;
    }
    Ok(Session::new(account_id, token))
}

/// Wait for the element but proceed anyway on timeout: the following lookup fails fast instead.
///
/// Returns whether the element has appeared.
async fn wait_optimistically<B: Browser + ?Sized>(
    browser: &mut B,
    locator: Locator,
    timeout: Duration,
) -> Result<bool> {
    let Err(error) = browser.wait_for(locator, timeout).await else {
        return Ok(true);
    };
    if matches!(error.downcast_ref::<BrowserError>(), Some(BrowserError::Timeout { .. })) {
        warn!("timeout for the page to load: {error:#}");
        Ok(false)
    } else {
        Err(error)
    }
}
