//! Cookie-consent dismissal. Best-effort: every path continues the run.

use crate::config::{Selectors, Timeouts};
use eoka::Page;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const ACCEPT_POLL_MS: u64 = 100;

/// What happened to the consent dialog. Never raised as an error; the run
/// proceeds in all three cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// The accept button was found and clicked.
    Dismissed,
    /// The dialog host never appeared.
    Absent,
    /// The host appeared but the accept button was not clickable in time.
    TimedOut,
}

impl std::fmt::Display for ConsentOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dismissed => write!(f, "dismissed"),
            Self::Absent => write!(f, "absent"),
            Self::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Finds the accept button, piercing open shadow roots, and clicks it.
/// Returns whether a click happened.
const ACCEPT_CLICK_JS: &str = r#"
(() => {
    function find(root) {
        const hit = root.querySelector(__accept_selector);
        if (hit) return hit;
        for (const node of root.querySelectorAll('*')) {
            if (node.shadowRoot) {
                const nested = find(node.shadowRoot);
                if (nested) return nested;
            }
        }
        return null;
    }
    const btn = find(document);
    if (!btn) return false;
    btn.click();
    return true;
})()
"#;

/// Dismiss the consent dialog if it shows up.
pub async fn dismiss(page: &Page, selectors: &Selectors, timeouts: &Timeouts) -> ConsentOutcome {
    if page
        .wait_for(&selectors.consent_host, timeouts.control_ms)
        .await
        .is_err()
    {
        debug!("consent dialog did not show up");
        return ConsentOutcome::Absent;
    }

    let js = format!(
        "var __accept_selector = {}; {}",
        serde_json::to_string(&selectors.consent_accept).unwrap(),
        ACCEPT_CLICK_JS
    );

    let deadline = Instant::now() + Duration::from_millis(timeouts.control_ms);
    loop {
        let clicked: bool = page.evaluate(&js).await.unwrap_or(false);
        if clicked {
            info!("consent dialog dismissed");
            return ConsentOutcome::Dismissed;
        }
        if Instant::now() >= deadline {
            debug!("consent dialog present but accept button not clickable");
            return ConsentOutcome::TimedOut;
        }
        page.wait(ACCEPT_POLL_MS).await;
    }
}
