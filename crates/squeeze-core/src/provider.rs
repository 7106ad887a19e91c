//! Ticker → analysis resolution
//!
//! The provider answers from the session store when it can and falls back to
//! one model call otherwise. It never retries.

use crate::analysis::Analysis;
use crate::client::{LlmModelClient, ModelClient, ModelRequest, RequestPurpose};
use crate::config::SqueezeConfig;
use crate::error::{ConfigError, ProviderError};
use crate::knowledge_base::{KnowledgeBase, normalize_ticker};
use crate::prompts;
use crate::store::AnalysisStore;
use crate::validator::{parse_payload, validate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Where a resolved analysis came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    /// Bundled, hand-authored entry
    KnowledgeBase,
    /// Generated earlier in this session
    Cached,
    /// Generated by the model for this request
    Generated,
}

impl AnalysisSource {
    pub fn is_ai_generated(self) -> bool {
        !matches!(self, Self::KnowledgeBase)
    }
}

/// A successfully resolved ticker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Normalized symbol
    pub ticker: String,
    pub analysis: Analysis,
    pub source: AnalysisSource,
}

/// Resolves tickers against the store and, on a miss, the model
#[derive(Clone)]
pub struct AnalysisProvider {
    store: AnalysisStore,
    client: Option<Arc<dyn ModelClient>>,
}

impl AnalysisProvider {
    pub fn new(store: AnalysisStore, client: Option<Arc<dyn ModelClient>>) -> Self {
        Self { store, client }
    }

    /// Provider over the bundled knowledge base, with a live client when a
    /// credential is configured
    pub fn from_config(config: &SqueezeConfig) -> Result<Self, ConfigError> {
        let store = AnalysisStore::seeded(&KnowledgeBase::builtin()?);
        let client = LlmModelClient::from_config(config)?
            .map(|client| Arc::new(client) as Arc<dyn ModelClient>);

        info!(
            known_tickers = store.builtin_count(),
            live = client.is_some(),
            "Analysis provider ready"
        );
        Ok(Self::new(store, client))
    }

    pub fn store(&self) -> &AnalysisStore {
        &self.store
    }

    pub fn client(&self) -> Option<&Arc<dyn ModelClient>> {
        self.client.as_ref()
    }

    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Resolve one ticker
    ///
    /// Concurrent calls for the same uncached ticker each reach the model;
    /// whichever finishes last owns the store entry.
    #[instrument(skip(self, ticker), fields(ticker = %ticker.trim()))]
    pub async fn resolve(&self, ticker: &str) -> Result<Resolution, ProviderError> {
        let ticker = normalize_ticker(ticker);

        if let Some(analysis) = self.store.get(&ticker).await {
            let source = if self.store.is_builtin(&ticker) {
                AnalysisSource::KnowledgeBase
            } else {
                AnalysisSource::Cached
            };
            debug!(?source, "Store hit");
            return Ok(Resolution {
                ticker,
                analysis,
                source,
            });
        }

        debug!("Store miss");
        let Some(client) = &self.client else {
            warn!("No model client configured");
            return Err(ProviderError::NoCredential);
        };

        let user = prompts::analyze_ticker_message(&ticker)
            .map_err(|e| ProviderError::Malformed(format!("prompt rendering failed: {e}")))?;
        let request = ModelRequest::new(
            RequestPurpose::Analysis,
            prompts::ANALYSIS_SYSTEM_PROMPT,
            user,
        );

        let text = client.generate(request).await?;
        let analysis = parse_analysis(&text)?;

        self.store.insert(&ticker, analysis.clone()).await;
        info!(score = analysis.score(), verdict = %analysis.verdict(), "Generated analysis");

        Ok(Resolution {
            ticker,
            analysis,
            source: AnalysisSource::Generated,
        })
    }
}

/// Turn raw model text into a repaired analysis with a company name
fn parse_analysis(text: &str) -> Result<Analysis, ProviderError> {
    let raw = parse_payload(text).map_err(|e| {
        warn!(error = %e, chars = text.len(), "Model reply is not JSON");
        ProviderError::Malformed(e.to_string())
    })?;

    let analysis = validate(&raw).inspect_err(|e| warn!(error = %e, "Rejected payload"))?;

    if analysis.name().trim().is_empty() {
        warn!("Payload has no company name");
        return Err(ProviderError::Malformed("missing company name".to_string()));
    }

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Verdict;
    use crate::client::MockModelClient;
    use crate::error::ProviderErrorKind;
    use crate::zones::ZoneKey;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn seeded_store() -> AnalysisStore {
        AnalysisStore::seeded(&KnowledgeBase::builtin().unwrap())
    }

    fn provider_with(mock: MockModelClient) -> AnalysisProvider {
        AnalysisProvider::new(seeded_store(), Some(Arc::new(mock)))
    }

    const ZZZZ_REPLY: &str = r#"```json
{"name": "Zeta Systems", "score": 45, "verdict": "COOKED", "tagline": "picks and shovels",
 "zones": {"sre": {"exposure": -30, "note": "sells the tooling"}}}
```"#;

    #[tokio::test]
    async fn test_knowledge_base_hit_skips_client() {
        let mut mock = MockModelClient::new();
        mock.expect_generate().times(0);
        let provider = provider_with(mock);

        let resolution = provider.resolve(" crm ").await.unwrap();
        assert_eq!(resolution.ticker, "CRM");
        assert_eq!(resolution.analysis.score(), -72);
        assert_eq!(resolution.analysis.verdict(), Verdict::Cooked);
        assert_eq!(resolution.source, AnalysisSource::KnowledgeBase);
        assert!(!resolution.source.is_ai_generated());
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_generated_and_cached() {
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .withf(|req| {
                req.purpose == RequestPurpose::Analysis
                    && req.system == prompts::ANALYSIS_SYSTEM_PROMPT
                    && req.user.contains("ZZZZ")
            })
            .times(1)
            .returning(|_| Ok(ZZZZ_REPLY.to_string()));
        let provider = provider_with(mock);

        let first = provider.resolve("zzzz").await.unwrap();
        assert_eq!(first.source, AnalysisSource::Generated);
        assert_eq!(first.analysis.score(), 45);
        assert_eq!(first.analysis.verdict(), Verdict::Rocket);
        assert_eq!(first.analysis.zones().get(ZoneKey::Sre).exposure(), -30);
        assert_eq!(first.analysis.zones().get(ZoneKey::Migration).note(), "No data");

        let second = provider.resolve("ZZZZ").await.unwrap();
        assert_eq!(second.source, AnalysisSource::Cached);
        assert_eq!(second.analysis, first.analysis);
    }

    #[tokio::test]
    async fn test_no_client_leaves_store_untouched() {
        let store = seeded_store();
        let provider = AnalysisProvider::new(store.clone(), None);

        let err = assert_err!(provider.resolve("ZZZZ").await);
        assert_eq!(err, ProviderError::NoCredential);
        assert_eq!(store.len().await, 25);
        assert!(store.get("ZZZZ").await.is_none());
    }

    #[tokio::test]
    async fn test_from_config_without_credential() {
        let provider = AnalysisProvider::from_config(&SqueezeConfig::default()).unwrap();
        assert!(!provider.has_client());
        assert_eq!(provider.store().len().await, 25);
    }

    #[tokio::test]
    async fn test_no_client_still_serves_known_tickers() {
        let provider = AnalysisProvider::new(seeded_store(), None);
        let resolution = assert_ok!(provider.resolve("NVDA").await);
        assert_eq!(resolution.analysis.verdict(), Verdict::Rocket);
    }

    #[tokio::test]
    async fn test_non_json_reply_is_malformed() {
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .returning(|_| Ok("I cannot find that company.".to_string()));
        let provider = provider_with(mock);

        let err = assert_err!(provider.resolve("QQQQ").await);
        assert_eq!(err.kind(), ProviderErrorKind::Malformed);
        assert!(provider.store().get("QQQQ").await.is_none());
    }

    #[tokio::test]
    async fn test_unshaped_reply_is_malformed() {
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .returning(|_| Ok(r#"{"error": "unknown ticker"}"#.to_string()));
        let provider = provider_with(mock);

        let err = assert_err!(provider.resolve("QQQQ").await);
        assert_eq!(err.kind(), ProviderErrorKind::Malformed);
    }

    #[tokio::test]
    async fn test_missing_name_is_malformed() {
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .returning(|_| Ok(r#"{"name": "  ", "score": 10}"#.to_string()));
        let provider = provider_with(mock);

        let err = assert_err!(provider.resolve("QQQQ").await);
        assert_eq!(err, ProviderError::Malformed("missing company name".to_string()));
    }

    #[tokio::test]
    async fn test_client_errors_pass_through() {
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(ProviderError::Timeout(Duration::from_secs(30))));
        let provider = provider_with(mock);

        let err = assert_err!(provider.resolve("QQQQ").await);
        assert_eq!(err.kind(), ProviderErrorKind::Timeout);
        assert!(err.is_retryable());
    }
}
