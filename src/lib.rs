//! # offer-scraper
//!
//! Headless-browser price scraper for product offer listings. One run drives
//! a single page: dismiss the cookie dialog (best-effort), click "load more"
//! until the offer list stops growing, pull each row's embedded JSON payload
//! out of its data attribute, validate it, and write the keyed result set to
//! disk as pretty-printed JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use offer_scraper::{Config, Scraper};
//!
//! # #[tokio::main]
//! # async fn main() -> offer_scraper::Result<()> {
//! let config = Config::default();
//! let mut scraper = Scraper::launch(&config.browser).await?;
//! let outcome = scraper.run(&config).await?;
//! scraper.close().await?;
//! println!("scraped {} offers", outcome.results.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod consent;
pub mod extract;
pub mod loader;
pub mod report;
pub mod scraper;

pub use config::{BrowserConfig, Config, Selectors, TargetUrl, Timeouts};
pub use consent::ConsentOutcome;
pub use extract::{Extraction, RawOfferPayload, ValidationIssue};
pub use loader::{LoadEnd, LoadSummary};
pub use report::{ResultSet, ScrapedItem};
pub use scraper::{ScrapeOutcome, Scraper};

/// Result type for offer-scraper operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading or a scrape run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("no offer rows found on the page")]
    NoListItems,

    #[error("malformed offer payload at row {position}: {source}")]
    Payload {
        position: usize,
        source: serde_json::Error,
    },

    #[error("failed to serialize scraped data: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_covers_builtin_target() {
        let config = Config::default();
        assert!(config.target.url.contains("idealo.de"));
        assert!(!config.browser.headless);
        assert_eq!(config.selectors.row, ".productOffers-listItemOfferPrice");
        assert_eq!(
            config.selectors.load_more,
            "button.productOffers-listLoadMore"
        );
        assert_eq!(config.selectors.payload_attribute, "data-dl-click");
        assert_eq!(config.timeouts.control_ms, 1000);
        assert_eq!(config.timeouts.growth_ms, 5000);
        assert_eq!(config.output, std::path::Path::new("scraped_data/data.json"));
        config.validate().expect("default config must validate");
    }

    #[test]
    fn test_parse_minimal_config() {
        let yaml = r#"
target:
  url: "https://example.com/offers"
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.target.url, "https://example.com/offers");
        // Everything else keeps its default.
        assert_eq!(config.selectors.row, ".productOffers-listItemOfferPrice");
        assert_eq!(config.timeouts.growth_ms, 5000);
    }

    #[test]
    fn test_parse_browser_config() {
        let yaml = r#"
target:
  url: "https://example.com"
browser:
  headless: true
  viewport:
    width: 1920
    height: 1080
"#;
        let config = Config::parse(yaml).unwrap();
        assert!(config.browser.headless);
        let viewport = config.browser.viewport;
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
    }

    #[test]
    fn test_parse_selectors_and_timeouts() {
        let yaml = r##"
target:
  url: "https://example.com"
selectors:
  row: ".offer-row"
  load_more: "#more"
timeouts:
  control_ms: 250
  growth_ms: 2000
output: "out/offers.json"
"##;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.selectors.row, ".offer-row");
        assert_eq!(config.selectors.load_more, "#more");
        // Unspecified selectors keep their defaults.
        assert_eq!(config.selectors.consent_host, "aside");
        assert_eq!(config.timeouts.control_ms, 250);
        assert_eq!(config.timeouts.growth_ms, 2000);
        assert_eq!(config.output, std::path::Path::new("out/offers.json"));
    }

    #[test]
    fn test_validation_empty_url() {
        let yaml = r#"
target:
  url: ""
"#;
        let result = Config::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("target.url"));
    }

    #[test]
    fn test_validation_empty_row_selector() {
        let yaml = r#"
target:
  url: "https://example.com"
selectors:
  row: ""
"#;
        let result = Config::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("selectors.row"));
    }

    #[test]
    fn test_validation_zero_timeout() {
        let yaml = r#"
target:
  url: "https://example.com"
timeouts:
  growth_ms: 0
"#;
        let result = Config::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeouts"));
    }
}
