//! Session store of resolved analyses
//!
//! Seeded from the knowledge base and grown by every successful model call.
//! Entries are never evicted for the lifetime of the store.

use crate::analysis::Analysis;
use crate::knowledge_base::{KnowledgeBase, normalize_ticker};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Most autocomplete entries returned at once
pub const MAX_SUGGESTIONS: usize = 6;

/// One autocomplete entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    /// A ticker the store already holds
    Known { ticker: String, name: String },
    /// The typed symbol itself, to be analyzed live
    Custom { ticker: String },
}

impl Suggestion {
    pub fn ticker(&self) -> &str {
        match self {
            Self::Known { ticker, .. } | Self::Custom { ticker } => ticker,
        }
    }
}

/// Thread-safe ticker → analysis map
///
/// Cloning shares the underlying map.
#[derive(Clone, Default)]
pub struct AnalysisStore {
    entries: Arc<RwLock<HashMap<String, Analysis>>>,
    builtin: Arc<HashSet<String>>,
}

impl AnalysisStore {
    /// Empty store with no knowledge base entries
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with every knowledge base entry
    pub fn seeded(kb: &KnowledgeBase) -> Self {
        let entries: HashMap<String, Analysis> = kb
            .iter()
            .map(|(ticker, analysis)| (ticker.to_string(), analysis.clone()))
            .collect();
        let builtin = entries.keys().cloned().collect();

        Self {
            entries: Arc::new(RwLock::new(entries)),
            builtin: Arc::new(builtin),
        }
    }

    /// Get an analysis by ticker, in any case
    pub async fn get(&self, ticker: &str) -> Option<Analysis> {
        let entries = self.entries.read().await;
        entries.get(&normalize_ticker(ticker)).cloned()
    }

    /// Insert or replace an analysis; the last write wins
    pub async fn insert(&self, ticker: &str, analysis: Analysis) {
        let mut entries = self.entries.write().await;
        entries.insert(normalize_ticker(ticker), analysis);
    }

    /// Whether the ticker came from the bundled knowledge base
    pub fn is_builtin(&self, ticker: &str) -> bool {
        self.builtin.contains(&normalize_ticker(ticker))
    }

    /// Number of knowledge base entries the store was seeded with
    pub fn builtin_count(&self) -> usize {
        self.builtin.len()
    }

    /// Get the number of stored analyses
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All stored tickers in sorted order
    pub async fn tickers(&self) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut tickers: Vec<String> = entries.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    /// Autocomplete over every stored ticker
    ///
    /// Matches a symbol prefix or a case-insensitive substring of the company
    /// name. When the input is not itself a stored symbol, the last slot is a
    /// [`Suggestion::Custom`] entry for it.
    pub async fn suggest(&self, input: &str) -> Vec<Suggestion> {
        let query = normalize_ticker(input);
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();

        let entries = self.entries.read().await;
        let mut matches: Vec<(&String, &Analysis)> = entries
            .iter()
            .filter(|(ticker, analysis)| {
                ticker.starts_with(&query) || analysis.name().to_lowercase().contains(&needle)
            })
            .collect();
        matches.sort_by(|a, b| a.0.cmp(b.0));

        let exact = entries.contains_key(&query);
        let limit = if exact { MAX_SUGGESTIONS } else { MAX_SUGGESTIONS - 1 };

        let mut suggestions: Vec<Suggestion> = matches
            .into_iter()
            .take(limit)
            .map(|(ticker, analysis)| Suggestion::Known {
                ticker: ticker.clone(),
                name: analysis.name().to_string(),
            })
            .collect();

        if !exact {
            suggestions.push(Suggestion::Custom { ticker: query });
        }
        suggestions
    }
}
