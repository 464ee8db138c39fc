//! List loading: drives the "load more" loop until the listing stops
//! growing.
//!
//! The loop deliberately treats every in-iteration failure as "no more pages
//! to load": a missing control, an unclickable control, and a row count that
//! never grows all end the loop the same way. [`LoadEnd`] keeps the exit
//! cause observable so a stall is not silently conflated with completion.

use crate::config::{Selectors, Timeouts};
use crate::{Error, Result};
use eoka::Page;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const GROWTH_POLL_MS: u64 = 250;

/// One offer listing, as seen by the load loop.
#[allow(async_fn_in_trait)]
pub trait Listing {
    /// Current number of rendered offer rows.
    async fn row_count(&self) -> Result<usize>;

    /// Wait briefly for the load-more control and click it.
    /// `false` when the control is absent or unclickable.
    async fn reveal_more(&self) -> bool;

    /// Wait for the row count to exceed `baseline`.
    /// `None` when it does not grow within the growth timeout.
    async fn wait_for_growth(&self, baseline: usize) -> Option<usize>;
}

/// How the load loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEnd {
    /// The load-more control disappeared or would not click.
    ControlMissing,
    /// A click happened but the row count did not grow in time.
    Stalled,
}

impl std::fmt::Display for LoadEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ControlMissing => write!(f, "control missing"),
            Self::Stalled => write!(f, "stalled"),
        }
    }
}

/// Outcome of a completed load loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Row count when the loop ended.
    pub rows: usize,
    /// Clicks that were followed by observed growth.
    pub clicks: usize,
    pub end: LoadEnd,
}

/// Reveal every row the listing can render.
///
/// Fails with [`Error::NoListItems`] when the listing starts empty; that is
/// a navigation or selector mismatch, not an empty result.
pub async fn load_all_rows<L: Listing>(listing: &L) -> Result<LoadSummary> {
    let mut rows = listing.row_count().await?;
    if rows == 0 {
        return Err(Error::NoListItems);
    }
    debug!("initial row count: {}", rows);

    let mut clicks = 0;
    let end = loop {
        if !listing.reveal_more().await {
            break LoadEnd::ControlMissing;
        }
        match listing.wait_for_growth(rows).await {
            Some(grown) => {
                debug!("row count grew: {} -> {}", rows, grown);
                rows = grown;
                clicks += 1;
            }
            None => break LoadEnd::Stalled,
        }
    };

    info!(
        "loaded all list items: {} rows after {} clicks ({})",
        rows, clicks, end
    );
    Ok(LoadSummary { rows, clicks, end })
}

/// Live-page [`Listing`] over an `eoka` page and the configured selectors.
pub struct PageListing<'a> {
    page: &'a Page,
    selectors: &'a Selectors,
    timeouts: &'a Timeouts,
}

impl<'a> PageListing<'a> {
    pub fn new(page: &'a Page, selectors: &'a Selectors, timeouts: &'a Timeouts) -> Self {
        Self {
            page,
            selectors,
            timeouts,
        }
    }

    async fn count(&self) -> Result<usize> {
        let js = format!(
            "document.querySelectorAll({}).length",
            serde_json::to_string(&self.selectors.row).unwrap()
        );
        Ok(self.page.evaluate(&js).await?)
    }
}

impl Listing for PageListing<'_> {
    async fn row_count(&self) -> Result<usize> {
        self.count().await
    }

    async fn reveal_more(&self) -> bool {
        if self
            .page
            .wait_for(&self.selectors.load_more, self.timeouts.control_ms)
            .await
            .is_err()
        {
            return false;
        }
        self.page
            .try_click(&self.selectors.load_more)
            .await
            .unwrap_or(false)
    }

    async fn wait_for_growth(&self, baseline: usize) -> Option<usize> {
        let deadline = Instant::now() + Duration::from_millis(self.timeouts.growth_ms);
        loop {
            if let Ok(count) = self.count().await {
                if count > baseline {
                    return Some(count);
                }
            }
            if Instant::now() >= deadline {
                return None;
            }
            self.page.wait(GROWTH_POLL_MS).await;
        }
    }
}
