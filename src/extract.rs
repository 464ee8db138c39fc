//! Item extraction: turns rendered offer rows into validated records.
//!
//! The DOM is read once, in bulk: one `evaluate` call returns the raw
//! payload attribute of every row in DOM order. Everything after that is
//! pure and runs over the captured strings.

use crate::report::{ResultSet, ScrapedItem};
use crate::{Error, Result};
use eoka::Page;
use serde::Deserialize;
use tracing::{debug, warn};

/// Offer payload as embedded in a row's data attribute.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOfferPayload {
    #[serde(default)]
    pub shop_name: String,

    /// Offer variants; only the first is consulted.
    #[serde(default)]
    pub products: Vec<OfferVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfferVariant {
    #[serde(default)]
    pub price: Option<f64>,
}

impl RawOfferPayload {
    /// Price of the first offer variant, if any.
    pub fn first_price(&self) -> Option<f64> {
        self.products.first().and_then(|v| v.price)
    }
}

/// Why a decoded row was dropped. Both issues can fire for the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationIssue {
    /// Price absent, zero, or NaN. The zero case is indistinguishable from
    /// "missing" on purpose, matching the listing's own falsy semantics.
    MissingPrice,
    /// Shop name absent or empty.
    MissingShopName,
}

/// Outcome of one extraction pass over the fully-loaded listing.
#[derive(Debug)]
pub struct Extraction {
    /// Validated items, keyed by 1-based row position.
    pub results: ResultSet,
    /// Rows decoded successfully but dropped by validation.
    pub rows_dropped: usize,
    /// Rows whose payload attribute was absent or empty (skipped silently).
    pub rows_without_payload: usize,
}

/// Bulk-read the payload attribute of every offer row, in DOM order.
///
/// `None` entries are rows where the attribute is absent.
pub async fn read_row_payloads(
    page: &Page,
    row_selector: &str,
    attribute: &str,
) -> Result<Vec<Option<String>>> {
    let js = format!(
        r#"(() => {{
            const rows = document.querySelectorAll({sel});
            return JSON.stringify(Array.from(rows).map(el => el.getAttribute({attr})));
        }})()"#,
        sel = serde_json::to_string(row_selector).unwrap(),
        attr = serde_json::to_string(attribute).unwrap(),
    );
    let json_str: String = page.evaluate(&js).await?;
    let attrs: Vec<Option<String>> = serde_json::from_str(&json_str)
        .map_err(|e| eoka::Error::CdpSimple(format!("row payload read error: {}", e)))?;
    debug!("read {} row payload attributes", attrs.len());
    Ok(attrs)
}

/// Decode, validate, and aggregate the captured row payloads.
///
/// Per row, 1-based position = index + 1. Rows without a payload are skipped
/// silently. A payload that is present but malformed aborts the run: the
/// page contract is broken at that point, not just one row.
pub fn extract_items(payloads: &[Option<String>]) -> Result<Extraction> {
    let mut results = ResultSet::new();
    let mut rows_dropped = 0;
    let mut rows_without_payload = 0;

    for (index, entry) in payloads.iter().enumerate() {
        let position = index + 1;

        let raw = match entry.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => {
                rows_without_payload += 1;
                continue;
            }
        };

        let payload: RawOfferPayload =
            serde_json::from_str(raw).map_err(|source| Error::Payload { position, source })?;

        let issues = validate(&payload);
        if !issues.is_empty() {
            for issue in &issues {
                match issue {
                    ValidationIssue::MissingPrice => {
                        warn!("price is missing in scraped row {}: {}", position, raw)
                    }
                    ValidationIssue::MissingShopName => {
                        warn!("shop name is missing in scraped row {}: {}", position, raw)
                    }
                }
            }
            rows_dropped += 1;
            continue;
        }

        results.insert(
            position,
            ScrapedItem {
                position,
                // Validation guarantees a present, nonzero price.
                price: payload.first_price().unwrap_or_default(),
                shop_name: payload.shop_name,
            },
        );
    }

    Ok(Extraction {
        results,
        rows_dropped,
        rows_without_payload,
    })
}

/// Check a decoded payload; each failing condition is reported independently.
pub fn validate(payload: &RawOfferPayload) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    match payload.first_price() {
        Some(p) if p != 0.0 && !p.is_nan() => {}
        _ => issues.push(ValidationIssue::MissingPrice),
    }

    if payload.shop_name.is_empty() {
        issues.push(ValidationIssue::MissingShopName);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> RawOfferPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_valid_payload_has_no_issues() {
        let p = payload(r#"{"shop_name":"A","products":[{"price":10}]}"#);
        assert!(validate(&p).is_empty());
        assert_eq!(p.first_price(), Some(10.0));
    }

    #[test]
    fn test_zero_price_is_missing_price() {
        let p = payload(r#"{"shop_name":"A","products":[{"price":0}]}"#);
        assert_eq!(validate(&p), vec![ValidationIssue::MissingPrice]);
    }

    #[test]
    fn test_empty_products_is_missing_price() {
        let p = payload(r#"{"shop_name":"A","products":[]}"#);
        assert_eq!(validate(&p), vec![ValidationIssue::MissingPrice]);
    }

    #[test]
    fn test_negative_price_is_valid() {
        // Falsy check only: a negative number passes, just like zero fails.
        let p = payload(r#"{"shop_name":"A","products":[{"price":-5}]}"#);
        assert!(validate(&p).is_empty());
    }

    #[test]
    fn test_empty_shop_name_is_missing_name() {
        let p = payload(r#"{"shop_name":"","products":[{"price":5}]}"#);
        assert_eq!(validate(&p), vec![ValidationIssue::MissingShopName]);
    }

    #[test]
    fn test_both_issues_fire_independently() {
        let p = payload(r#"{"shop_name":"","products":[{"price":0}]}"#);
        assert_eq!(
            validate(&p),
            vec![
                ValidationIssue::MissingPrice,
                ValidationIssue::MissingShopName
            ]
        );
    }

    #[test]
    fn test_extract_three_row_example() {
        let payloads = vec![
            Some(r#"{"shop_name":"A","products":[{"price":10}]}"#.to_string()),
            None,
            Some(r#"{"shop_name":"","products":[{"price":5}]}"#.to_string()),
        ];
        let extraction = extract_items(&payloads).unwrap();

        assert_eq!(extraction.results.len(), 1);
        assert_eq!(extraction.rows_without_payload, 1);
        assert_eq!(extraction.rows_dropped, 1);

        let (key, item) = extraction.results.iter().next().unwrap();
        assert_eq!(key, "1");
        assert_eq!(
            item,
            &ScrapedItem {
                position: 1,
                price: 10.0,
                shop_name: "A".into()
            }
        );
    }

    #[test]
    fn test_positions_keep_gaps_after_skips() {
        let payloads = vec![
            Some(r#"{"shop_name":"","products":[{"price":1}]}"#.to_string()),
            Some(r#"{"shop_name":"B","products":[{"price":2}]}"#.to_string()),
            None,
            Some(r#"{"shop_name":"D","products":[{"price":4}]}"#.to_string()),
        ];
        let extraction = extract_items(&payloads).unwrap();

        let keys: Vec<&str> = extraction.results.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["2", "4"]);
    }

    #[test]
    fn test_empty_attribute_is_skipped_silently() {
        let payloads = vec![Some(String::new())];
        let extraction = extract_items(&payloads).unwrap();
        assert!(extraction.results.is_empty());
        assert_eq!(extraction.rows_without_payload, 1);
        assert_eq!(extraction.rows_dropped, 0);
    }

    #[test]
    fn test_malformed_payload_is_fatal_with_position() {
        let payloads = vec![
            Some(r#"{"shop_name":"A","products":[{"price":10}]}"#.to_string()),
            Some("not json".to_string()),
        ];
        let err = extract_items(&payloads).unwrap_err();
        match err {
            crate::Error::Payload { position, .. } => assert_eq!(position, 2),
            other => panic!("expected payload error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_payload_fields_are_ignored() {
        let p = payload(
            r#"{"shop_name":"A","products":[{"price":3,"currency":"EUR"}],"tracking":{"id":1}}"#,
        );
        assert!(validate(&p).is_empty());
    }
}
