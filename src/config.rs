use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level config structure. Every field has a default covering the
/// built-in target page, so a run needs no config file at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target URL to navigate to.
    pub target: TargetUrl,

    /// Browser launch configuration.
    pub browser: BrowserConfig,

    /// CSS selectors for the offer listing.
    pub selectors: Selectors,

    /// Wait timeouts for the load-more loop.
    pub timeouts: Timeouts,

    /// Output file for the scraped result set.
    pub output: PathBuf,
}

impl Config {
    /// Load config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse config from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the config.
    pub fn validate(&self) -> Result<()> {
        if self.target.url.is_empty() {
            return Err(Error::Config("target.url is required".into()));
        }
        if self.selectors.row.is_empty() {
            return Err(Error::Config("selectors.row is required".into()));
        }
        if self.selectors.load_more.is_empty() {
            return Err(Error::Config("selectors.load_more is required".into()));
        }
        if self.selectors.payload_attribute.is_empty() {
            return Err(Error::Config(
                "selectors.payload_attribute is required".into(),
            ));
        }
        if self.timeouts.control_ms == 0 || self.timeouts.growth_ms == 0 {
            return Err(Error::Config("timeouts must be nonzero".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: TargetUrl::default(),
            browser: BrowserConfig::default(),
            selectors: Selectors::default(),
            timeouts: Timeouts::default(),
            output: PathBuf::from("scraped_data/data.json"),
        }
    }
}

/// Target URL configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetUrl {
    /// URL to navigate to.
    pub url: String,
}

impl Default for TargetUrl {
    fn default() -> Self {
        Self {
            url: "https://www.idealo.de/preisvergleich/OffersOfProduct/201846460_-aspirin-plus-c-forte-800-mg-480-mg-brausetabletten-bayer.html".into(),
        }
    }
}

/// Browser launch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode.
    pub headless: bool,

    /// Viewport size.
    pub viewport: Viewport,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport: Viewport::default(),
        }
    }
}

/// Viewport dimensions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1024,
        }
    }
}

/// CSS selectors for the offer listing page.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// One match per rendered offer row.
    pub row: String,

    /// The "load more" control that reveals additional rows.
    pub load_more: String,

    /// Host element of the cookie consent dialog.
    pub consent_host: String,

    /// Accept button inside the consent dialog (may live in a shadow root).
    pub consent_accept: String,

    /// Row attribute carrying the embedded JSON payload.
    pub payload_attribute: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            row: ".productOffers-listItemOfferPrice".into(),
            load_more: "button.productOffers-listLoadMore".into(),
            consent_host: "aside".into(),
            consent_accept: "#accept".into(),
            payload_attribute: "data-dl-click".into(),
        }
    }
}

/// Wait timeouts for the load-more loop, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Short wait for the load-more control (and consent dialog) to appear.
    pub control_ms: u64,

    /// Longer wait for the row count to grow after a click.
    pub growth_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            control_ms: 1000,
            growth_ms: 5000,
        }
    }
}
