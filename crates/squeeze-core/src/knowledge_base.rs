//! Pre-authored analyses bundled with the crate

use crate::analysis::{Analysis, Verdict};
use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

const BUILTIN_DATA: &str = include_str!("../data/known_tickers.json");

/// Verdict label as written in the table, if any
#[derive(Deserialize)]
struct AuthoredVerdict {
    #[serde(default)]
    verdict: Option<String>,
}

/// Immutable ticker → analysis table
///
/// Entries are trusted and never pass through the validator; their verdicts
/// are derived from the authored scores when the table is loaded.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: BTreeMap<String, Analysis>,
}

impl KnowledgeBase {
    /// Load the bundled table
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_DATA)
    }

    /// Load a table from a JSON object keyed by ticker
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Analysis> =
            serde_json::from_str(json).map_err(|e| ConfigError::KnowledgeBase(e.to_string()))?;
        let authored: BTreeMap<String, AuthoredVerdict> =
            serde_json::from_str(json).map_err(|e| ConfigError::KnowledgeBase(e.to_string()))?;

        let entries: BTreeMap<String, Analysis> = raw
            .into_iter()
            .map(|(ticker, analysis)| (normalize_ticker(&ticker), analysis))
            .collect();

        for (ticker, label, derived) in overridden_verdicts(&entries, &authored) {
            debug!(ticker, authored = label, %derived, "Authored verdict replaced by score");
        }

        Ok(Self { entries })
    }

    /// Case-insensitive exact lookup on the symbol
    pub fn lookup(&self, ticker: &str) -> Option<&Analysis> {
        self.entries.get(&normalize_ticker(ticker))
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.lookup(ticker).is_some()
    }

    /// Entries in ticker order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Analysis)> {
        self.entries.iter().map(|(t, a)| (t.as_str(), a))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entries whose written verdict disagrees with the one their score derives
fn overridden_verdicts<'a>(
    entries: &BTreeMap<String, Analysis>,
    authored: &'a BTreeMap<String, AuthoredVerdict>,
) -> Vec<(&'a str, &'a str, Verdict)> {
    authored
        .iter()
        .filter_map(|(ticker, written)| {
            let label = written.verdict.as_deref()?;
            let derived = entries.get(&normalize_ticker(ticker))?.verdict();
            (!label.trim().eq_ignore_ascii_case(derived.label()))
                .then_some((ticker.as_str(), label, derived))
        })
        .collect()
}

/// Canonical form of a ticker symbol: trimmed and uppercased
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}
