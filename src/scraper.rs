//! Run orchestration: one browser, one page, one sequential scrape.

use crate::config::{BrowserConfig, Config};
use crate::consent::{self, ConsentOutcome};
use crate::extract::{self, Extraction};
use crate::loader::{self, LoadSummary, PageListing};
use crate::report::ResultSet;
use crate::Result;
use eoka::{Browser, Page};
use tracing::{debug, info};

/// Everything one run produced, before serialization.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub consent: ConsentOutcome,
    pub load: LoadSummary,
    pub results: ResultSet,
    /// Rows decoded but dropped by validation.
    pub rows_dropped: usize,
    /// Rows with no payload attribute, skipped silently.
    pub rows_without_payload: usize,
}

/// Drives the scrape against a single page.
pub struct Scraper {
    browser: Browser,
    page: Page,
}

impl Scraper {
    /// Launch the browser and open the page the run will own.
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            viewport_width: config.viewport.width,
            viewport_height: config.viewport.height,
            ..Default::default()
        };

        debug!("launching browser (headless: {})", config.headless);
        let browser = Browser::launch_with_config(stealth).await?;
        let page = browser.new_page("about:blank").await?;

        Ok(Self { browser, page })
    }

    /// Get a reference to the page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Run the full scrape: navigate, dismiss consent, load every row,
    /// extract and validate. Serialization and persistence happen after the
    /// caller has released the browser.
    pub async fn run(&mut self, config: &Config) -> Result<ScrapeOutcome> {
        info!("navigating to {}", config.target.url);
        self.page.goto(&config.target.url).await?;

        let consent = consent::dismiss(&self.page, &config.selectors, &config.timeouts).await;
        info!("consent dialog: {}", consent);

        let listing = PageListing::new(&self.page, &config.selectors, &config.timeouts);
        let load = loader::load_all_rows(&listing).await?;

        let payloads = extract::read_row_payloads(
            &self.page,
            &config.selectors.row,
            &config.selectors.payload_attribute,
        )
        .await?;
        let Extraction {
            results,
            rows_dropped,
            rows_without_payload,
        } = extract::extract_items(&payloads)?;
        info!(
            "extracted {} offers ({} dropped, {} without payload)",
            results.len(),
            rows_dropped,
            rows_without_payload
        );

        Ok(ScrapeOutcome {
            consent,
            load,
            results,
            rows_dropped,
            rows_without_payload,
        })
    }

    /// Close the browser.
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}
