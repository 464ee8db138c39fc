//! Result aggregation and persistence.
//!
//! Valid rows accumulate in a [`ResultSet`] keyed by the decimal string of
//! their 1-based row position. The set serializes to a JSON object in
//! insertion order; the write to disk is attempted once and its failure is
//! reported but never fails the run.

use crate::{Error, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::path::Path;
use tracing::{info, warn};

/// One validated offer, the persisted unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedItem {
    /// 1-based ordinal among all rows encountered. Invalid rows still
    /// consume a position, so the key sequence may have gaps.
    pub position: usize,
    pub price: f64,
    pub shop_name: String,
}

/// Insertion-ordered mapping from position key to [`ScrapedItem`].
///
/// Write-once per run: positions strictly increase per row, so no two
/// insertions ever share a key.
#[derive(Debug, Default)]
pub struct ResultSet {
    entries: Vec<(String, ScrapedItem)>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `item` under the decimal string of `position`.
    pub fn insert(&mut self, position: usize, item: ScrapedItem) {
        self.entries.push((position.to_string(), item));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScrapedItem)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render the set as pretty-printed JSON (2-space indentation).
    ///
    /// A rendering failure is fatal and must abort before any write attempt.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::Serialize)
    }
}

impl Serialize for ResultSet {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, item) in &self.entries {
            map.serialize_entry(key, item)?;
        }
        map.end()
    }
}

/// Write the rendered result set to `path`.
///
/// Fire-and-forget: a write failure is logged and reported as `false` but
/// does not affect the run outcome.
pub fn write_report(json: &str, path: &Path) -> bool {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("failed to create output directory {}: {}", parent.display(), e);
                return false;
            }
        }
    }
    match std::fs::write(path, json) {
        Ok(()) => {
            info!("wrote scraped data to {}", path.display());
            true
        }
        Err(e) => {
            warn!("failed to write scraped data to {}: {}", path.display(), e);
            false
        }
    }
}
