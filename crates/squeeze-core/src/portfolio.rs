//! Portfolio batch analysis
//!
//! Tickers are resolved one after another in input order. Failures are
//! skipped, never retried. When at least two tickers resolve and a model is
//! configured, one extra request synthesizes a portfolio-level view.

use crate::analysis::PortfolioSynthesis;
use crate::client::{ModelRequest, RequestPurpose};
use crate::config::SqueezeConfig;
use crate::error::{PortfolioError, ProviderError, SYNTHESIS_FAILURE_MESSAGE};
use crate::prompts;
use crate::provider::{AnalysisProvider, Resolution};
use crate::validator::{parse_payload, validate_synthesis};
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Fewest resolved tickers worth synthesizing
pub const MIN_SYNTHESIS_HOLDINGS: usize = 2;

/// Split free text into candidate ticker symbols
///
/// Uppercases, splits on commas and whitespace, strips `$`, and keeps tokens
/// of 1 to `max_len` characters. Duplicates are kept.
pub fn parse_tickers(input: &str, max_len: usize) -> Vec<String> {
    input
        .to_uppercase()
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|token| token.replace('$', ""))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty() && token.chars().count() <= max_len)
        .collect()
}

/// Check the number of tickers against the portfolio bounds
pub fn validate_portfolio(tickers: &[String], min: usize, max: usize) -> Result<(), PortfolioError> {
    let count = tickers.len();
    if count < min {
        return Err(PortfolioError::TooFew { count, min });
    }
    if count > max {
        return Err(PortfolioError::TooMany { count, max });
    }
    Ok(())
}

/// A step of a running batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// About to resolve the `position`-th ticker (1-based)
    Analyzing {
        ticker: String,
        position: usize,
        total: usize,
    },
    /// A ticker finished, successfully or not
    Finished {
        ticker: String,
        completed: usize,
        total: usize,
        resolved: bool,
    },
    Synthesizing,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyzing {
                ticker,
                position,
                total,
            } => write!(f, "Analyzing {ticker}... ({position}/{total})"),
            Self::Finished {
                ticker,
                completed,
                total,
                resolved,
            } => {
                let outcome = if *resolved { "Finished" } else { "Skipped" };
                write!(f, "{outcome} {ticker} ({completed}/{total})")
            }
            Self::Synthesizing => f.write_str("Synthesizing portfolio..."),
        }
    }
}

/// What happened to the synthesis step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Completed { synthesis: PortfolioSynthesis },
    /// The request was made and failed; per-ticker results are unaffected
    Failed {
        message: String,
        #[serde(skip)]
        error: ProviderError,
    },
    /// Not attempted
    Skipped { reason: String },
}

impl SynthesisOutcome {
    pub fn synthesis(&self) -> Option<&PortfolioSynthesis> {
        match self {
            Self::Completed { synthesis } => Some(synthesis),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of a finished batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    /// Tickers as submitted, in order
    pub requested: Vec<String>,
    /// Resolved tickers, one per symbol, in order of first appearance
    pub results: Vec<Resolution>,
    /// Tickers that failed to resolve
    pub skipped: Vec<String>,
    pub synthesis: SynthesisOutcome,
}

impl PortfolioReport {
    /// Whether the batch finished with a synthesis error
    pub fn is_partial(&self) -> bool {
        self.synthesis.is_failed()
    }
}

/// Keep one result per ticker: a repeat replaces the value in its first position
fn record(results: &mut Vec<Resolution>, resolution: Resolution) {
    match results.iter_mut().find(|r| r.ticker == resolution.ticker) {
        Some(existing) => *existing = resolution,
        None => results.push(resolution),
    }
}

/// Sequential batch driver over an [`AnalysisProvider`]
#[derive(Clone)]
pub struct PortfolioOrchestrator {
    provider: AnalysisProvider,
    min_tickers: usize,
    max_tickers: usize,
    max_ticker_len: usize,
}

impl PortfolioOrchestrator {
    pub fn new(provider: AnalysisProvider, config: &SqueezeConfig) -> Self {
        Self {
            provider,
            min_tickers: config.min_portfolio,
            max_tickers: config.max_portfolio,
            max_ticker_len: config.max_ticker_len,
        }
    }

    pub fn provider(&self) -> &AnalysisProvider {
        &self.provider
    }

    /// Parse and bound-check free-text input without touching the network
    pub fn prepare(&self, input: &str) -> Result<Vec<String>, PortfolioError> {
        let tickers = parse_tickers(input, self.max_ticker_len);
        validate_portfolio(&tickers, self.min_tickers, self.max_tickers)?;
        Ok(tickers)
    }

    /// Resolve every ticker in order, then synthesize
    #[instrument(skip(self, tickers, on_progress), fields(total = tickers.len()))]
    pub async fn run<F>(&self, tickers: &[String], mut on_progress: F) -> PortfolioReport
    where
        F: FnMut(&ProgressEvent),
    {
        let total = tickers.len();
        let mut results = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        for (i, ticker) in tickers.iter().enumerate() {
            on_progress(&ProgressEvent::Analyzing {
                ticker: ticker.clone(),
                position: i + 1,
                total,
            });

            let resolved = match self.provider.resolve(ticker).await {
                Ok(resolution) => {
                    record(&mut results, resolution);
                    true
                }
                Err(e) => {
                    warn!(ticker = %ticker, error = %e, "Skipping ticker");
                    if !skipped.contains(ticker) {
                        skipped.push(ticker.clone());
                    }
                    false
                }
            };

            on_progress(&ProgressEvent::Finished {
                ticker: ticker.clone(),
                completed: i + 1,
                total,
                resolved,
            });
        }

        let synthesis = self.synthesize(&results, &mut on_progress).await;
        info!(
            resolved = results.len(),
            skipped = skipped.len(),
            partial = synthesis.is_failed(),
            "Portfolio batch finished"
        );

        PortfolioReport {
            requested: tickers.to_vec(),
            results,
            skipped,
            synthesis,
        }
    }

    async fn synthesize<F>(&self, results: &[Resolution], on_progress: &mut F) -> SynthesisOutcome
    where
        F: FnMut(&ProgressEvent),
    {
        if results.len() < MIN_SYNTHESIS_HOLDINGS {
            return SynthesisOutcome::Skipped {
                reason: format!("fewer than {MIN_SYNTHESIS_HOLDINGS} tickers resolved"),
            };
        }
        let Some(client) = self.provider.client() else {
            debug!("No model client, skipping synthesis");
            return SynthesisOutcome::Skipped {
                reason: "no model credential configured".to_string(),
            };
        };

        on_progress(&ProgressEvent::Synthesizing);

        let holdings: Vec<String> = results
            .iter()
            .map(|r| r.analysis.summary_line(&r.ticker))
            .collect();

        let outcome = async {
            let user = prompts::synthesize_portfolio_message(&holdings)
                .map_err(|e| ProviderError::Malformed(format!("prompt rendering failed: {e}")))?;
            let request = ModelRequest::new(
                RequestPurpose::Synthesis,
                prompts::PORTFOLIO_SYSTEM_PROMPT,
                user,
            );
            let text = client.generate(request).await?;
            let raw = parse_payload(&text).map_err(|e| ProviderError::Malformed(e.to_string()))?;
            Ok::<_, ProviderError>(validate_synthesis(&raw)?)
        }
        .await;

        match outcome {
            Ok(synthesis) => SynthesisOutcome::Completed { synthesis },
            Err(error) => {
                warn!(error = %error, "Portfolio synthesis failed");
                SynthesisOutcome::Failed {
                    message: SYNTHESIS_FAILURE_MESSAGE.to_string(),
                    error,
                }
            }
        }
    }
}

/// Portfolio batch lifecycle
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PortfolioState {
    Idle,
    Running { completed: usize, total: usize },
    Synthesizing,
    Ready { report: PortfolioReport },
    /// Finished, but the synthesis step failed
    Partial { report: PortfolioReport },
}

impl PortfolioState {
    pub fn report(&self) -> Option<&PortfolioReport> {
        match self {
            Self::Ready { report } | Self::Partial { report } => Some(report),
            _ => None,
        }
    }
}

/// Observable wrapper that drives an orchestrator through [`PortfolioState`]
pub struct PortfolioSession {
    orchestrator: PortfolioOrchestrator,
    state: watch::Sender<PortfolioState>,
}

impl PortfolioSession {
    pub fn new(orchestrator: PortfolioOrchestrator) -> Self {
        let (state, _) = watch::channel(PortfolioState::Idle);
        Self {
            orchestrator,
            state,
        }
    }

    pub fn state(&self) -> PortfolioState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PortfolioState> {
        self.state.subscribe()
    }

    /// Validate `input` and run the batch
    ///
    /// Rejected input returns the error and leaves the state untouched.
    /// `on_progress` sees every step in addition to the state channel.
    pub async fn submit<F>(&self, input: &str, mut on_progress: F) -> Result<PortfolioState, PortfolioError>
    where
        F: FnMut(&ProgressEvent),
    {
        let tickers = self.orchestrator.prepare(input)?;
        let total = tickers.len();
        self.state
            .send_replace(PortfolioState::Running { completed: 0, total });

        let report = self
            .orchestrator
            .run(&tickers, |event| {
                match event {
                    ProgressEvent::Finished {
                        completed, total, ..
                    } => {
                        self.state.send_replace(PortfolioState::Running {
                            completed: *completed,
                            total: *total,
                        });
                    }
                    ProgressEvent::Synthesizing => {
                        self.state.send_replace(PortfolioState::Synthesizing);
                    }
                    ProgressEvent::Analyzing { .. } => {}
                }
                on_progress(event);
            })
            .await;

        let next = if report.is_partial() {
            PortfolioState::Partial { report }
        } else {
            PortfolioState::Ready { report }
        };
        self.state.send_replace(next.clone());
        Ok(next)
    }

    /// Return to `Idle`
    pub fn reset(&self) {
        self.state.send_replace(PortfolioState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Verdict;
    use crate::client::{MockModelClient, ModelClient};
    use crate::knowledge_base::KnowledgeBase;
    use crate::store::AnalysisStore;
    use mockall::Sequence;
    use std::sync::Arc;

    fn orchestrator(client: Option<MockModelClient>) -> PortfolioOrchestrator {
        let store = AnalysisStore::seeded(&KnowledgeBase::builtin().unwrap());
        let client = client.map(|c| Arc::new(c) as Arc<dyn ModelClient>);
        PortfolioOrchestrator::new(
            AnalysisProvider::new(store, client),
            &SqueezeConfig::default(),
        )
    }

    fn tickers(n: usize) -> String {
        (0..n).map(|i| format!("T{i}")).collect::<Vec<_>>().join(",")
    }

    #[test]
    fn test_parse_tickers() {
        assert_eq!(
            parse_tickers(" $crm, nvda  msft,,$$ toolongticker ", 6),
            vec!["CRM", "NVDA", "MSFT"]
        );
        assert_eq!(parse_tickers("crm crm", 6), vec!["CRM", "CRM"]);
        assert!(parse_tickers("  , $ ", 6).is_empty());
    }

    #[test]
    fn test_portfolio_bounds() {
        let orchestrator = orchestrator(None);

        assert_eq!(
            orchestrator.prepare("CRM"),
            Err(PortfolioError::TooFew { count: 1, min: 2 })
        );
        assert_eq!(
            orchestrator.prepare(&tickers(16)),
            Err(PortfolioError::TooMany { count: 16, max: 15 })
        );
        assert_eq!(orchestrator.prepare(&tickers(2)).unwrap().len(), 2);
        assert_eq!(orchestrator.prepare(&tickers(15)).unwrap().len(), 15);
    }

    #[test]
    fn test_progress_text() {
        let analyzing = ProgressEvent::Analyzing {
            ticker: "CRM".into(),
            position: 2,
            total: 3,
        };
        assert_eq!(analyzing.to_string(), "Analyzing CRM... (2/3)");

        let finished = ProgressEvent::Finished {
            ticker: "CRM".into(),
            completed: 2,
            total: 3,
            resolved: true,
        };
        assert_eq!(finished.to_string(), "Finished CRM (2/3)");

        let skipped = ProgressEvent::Finished {
            ticker: "ZZZZ".into(),
            completed: 3,
            total: 3,
            resolved: false,
        };
        assert_eq!(skipped.to_string(), "Skipped ZZZZ (3/3)");
    }

    #[tokio::test]
    async fn test_failures_are_skipped_in_order() {
        let orchestrator = orchestrator(None);
        let tickers = orchestrator.prepare("CRM, ZZZZ, NVDA").unwrap();

        let mut events = Vec::new();
        let report = orchestrator.run(&tickers, |e| events.push(e.to_string())).await;

        let resolved: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(resolved, vec!["CRM", "NVDA"]);
        assert_eq!(report.skipped, vec!["ZZZZ"]);
        assert_eq!(
            events,
            vec![
                "Analyzing CRM... (1/3)",
                "Finished CRM (1/3)",
                "Analyzing ZZZZ... (2/3)",
                "Skipped ZZZZ (2/3)",
                "Analyzing NVDA... (3/3)",
                "Finished NVDA (3/3)",
            ]
        );
        assert!(matches!(report.synthesis, SynthesisOutcome::Skipped { .. }));
        assert!(!report.is_partial());
    }

    #[tokio::test]
    async fn test_repeated_ticker_counts_once() {
        let mut mock = MockModelClient::new();
        mock.expect_generate().times(0);
        let orchestrator = orchestrator(Some(mock));
        let tickers = orchestrator.prepare("CRM crm").unwrap();
        assert_eq!(tickers.len(), 2);

        let mut finished = 0;
        let report = orchestrator
            .run(&tickers, |e| {
                if matches!(e, ProgressEvent::Finished { .. }) {
                    finished += 1;
                }
            })
            .await;

        assert_eq!(finished, 2);
        assert_eq!(report.requested, vec!["CRM", "CRM"]);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].ticker, "CRM");
        assert!(matches!(report.synthesis, SynthesisOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_repeats_keep_first_position() {
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .withf(|req| req.purpose == RequestPurpose::Synthesis)
            .times(1)
            .returning(|req| {
                assert_eq!(req.user.matches("CRM (Salesforce)").count(), 1);
                Ok(r#"{"overallScore": -10}"#.to_string())
            });
        let orchestrator = orchestrator(Some(mock));
        let tickers = orchestrator.prepare("CRM NVDA $crm").unwrap();

        let report = orchestrator.run(&tickers, |_| {}).await;

        let resolved: Vec<&str> = report.results.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(resolved, vec!["CRM", "NVDA"]);
        assert!(report.synthesis.synthesis().is_some());
    }

    #[tokio::test]
    async fn test_synthesis_completes() {
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .withf(|req| {
                req.purpose == RequestPurpose::Synthesis
                    && req.user.contains("CRM (Salesforce): score=-72, verdict=COOKED")
                    && req.user.contains("NVDA (NVIDIA)")
            })
            .times(1)
            .returning(|_| {
                Ok(r#"```json
{"overallScore": -150, "headline": "Seat tax exposure", "playbook": 7}
```"#
                    .to_string())
            });
        let orchestrator = orchestrator(Some(mock));
        let tickers = orchestrator.prepare("CRM NVDA").unwrap();

        let report = orchestrator.run(&tickers, |_| {}).await;
        let synthesis = report.synthesis.synthesis().unwrap();
        assert_eq!(synthesis.overall_score(), -100);
        assert_eq!(synthesis.overall_verdict(), Verdict::Cooked);
        assert_eq!(synthesis.headline, "Seat tax exposure");
        assert_eq!(synthesis.playbook, "");
    }

    #[tokio::test]
    async fn test_failed_synthesis_keeps_results() {
        let mut seq = Sequence::new();
        let mut mock = MockModelClient::new();
        mock.expect_generate()
            .withf(|req| req.purpose == RequestPurpose::Analysis)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(r#"{"name": "Zeta", "score": 45}"#.to_string()));
        mock.expect_generate()
            .withf(|req| req.purpose == RequestPurpose::Synthesis)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ProviderError::Network("HTTP 503".into())));
        let session = PortfolioSession::new(orchestrator(Some(mock)));

        let state = session.submit("CRM ZZZZ NVDA", |_| {}).await.unwrap();

        let PortfolioState::Partial { report } = &state else {
            panic!("expected partial state, got {state:?}");
        };
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[1].analysis.verdict(), Verdict::Rocket);
        assert_eq!(
            report.synthesis,
            SynthesisOutcome::Failed {
                message: SYNTHESIS_FAILURE_MESSAGE.into(),
                error: ProviderError::Network("HTTP 503".into()),
            }
        );
        assert_eq!(session.state(), state);
    }

    #[tokio::test]
    async fn test_rejected_input_leaves_state_alone() {
        let mut mock = MockModelClient::new();
        mock.expect_generate().times(0);
        let session = PortfolioSession::new(orchestrator(Some(mock)));

        let err = session.submit("CRM", |_| {}).await.unwrap_err();
        assert_eq!(err.count(), 1);
        assert_eq!(session.state(), PortfolioState::Idle);
    }

    #[tokio::test]
    async fn test_state_channel_tracks_progress() {
        let session = PortfolioSession::new(orchestrator(None));
        let rx = session.subscribe();

        let state = session.submit("CRM NVDA", |_| {}).await.unwrap();

        assert!(matches!(state, PortfolioState::Ready { .. }));
        assert_eq!(state.report().unwrap().results.len(), 2);
        assert_eq!(*rx.borrow(), state);

        session.reset();
        assert_eq!(session.state(), PortfolioState::Idle);
    }
}
