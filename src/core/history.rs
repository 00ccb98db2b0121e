use std::fmt::Display;

use async_trait::async_trait;

use crate::{
    core::{consumption::ConsumptionRecord, window::Window},
    prelude::*,
};

/// Anything that is able to return daily consumption for a window.
#[async_trait]
pub trait HistorySource: Sync {
    type Error: Display + Send;

    async fn get_daily_history(
        &self,
        window: Window,
    ) -> Result<Vec<ConsumptionRecord>, Self::Error>;
}

/// Consumption history accumulated over the successfully fetched windows.
#[must_use]
pub struct History<E> {
    /// Records in window order, failed windows contribute nothing.
    pub records: Vec<ConsumptionRecord>,

    /// Windows which failed to fetch, in window order.
    pub failures: Vec<(Window, E)>,
}

impl<E> Default for History<E> {
    fn default() -> Self {
        Self { records: Vec::new(), failures: Vec::new() }
    }
}

/// Fetch the windows one by one, skipping those which fail.
///
/// Each window is attempted exactly once. A failed window is logged and recorded
/// in [`History::failures`], it never aborts the whole fetch.
#[instrument(skip_all)]
pub async fn fetch_history<S: HistorySource>(
    source: &S,
    windows: impl IntoIterator<Item = Window>,
) -> History<S::Error> {
    let mut history = History::default();
    for window in windows {
        match source.get_daily_history(window).await {
            Ok(records) => {
                debug!(%window, n_records = records.len(), "fetched");
                history.records.extend(records);
            }
            Err(error) => {
                warn!(
                    start = %window.start,
                    end = %window.end,
                    "could not retrieve the period: {error:#}",
                );
                history.failures.push((window, error));
            }
        }
    }
    info!(
        n_records = history.records.len(),
        n_failures = history.failures.len(),
        "fetched the history",
    );
    history
}
