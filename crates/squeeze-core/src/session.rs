//! Single-ticker session state machine
//!
//! `Idle → Resolving → Ready | Failed`, with `reset` back to `Idle` from
//! anywhere. State changes are published on a [`tokio::sync::watch`] channel
//! so a presentation layer can follow along.

use crate::analysis::Analysis;
use crate::error::{ProviderError, ProviderErrorKind};
use crate::knowledge_base::normalize_ticker;
use crate::provider::{AnalysisProvider, AnalysisSource, Resolution};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Resolving {
        ticker: String,
    },
    Ready {
        ticker: String,
        analysis: Analysis,
        source: AnalysisSource,
        resolved_at: DateTime<Utc>,
    },
    Failed {
        ticker: String,
        kind: ProviderErrorKind,
        message: String,
        retryable: bool,
    },
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self, Self::Resolving { .. })
    }

    /// Ticker the state refers to, if any
    pub fn ticker(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Resolving { ticker }
            | Self::Ready { ticker, .. }
            | Self::Failed { ticker, .. } => Some(ticker),
        }
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        match self {
            Self::Ready { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    /// User-facing error text of a failed state
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    fn from_outcome(ticker: String, outcome: Result<Resolution, ProviderError>) -> Self {
        match outcome {
            Ok(resolution) => Self::Ready {
                ticker: resolution.ticker,
                analysis: resolution.analysis,
                source: resolution.source,
                resolved_at: Utc::now(),
            },
            Err(err) => Self::Failed {
                ticker,
                kind: err.kind(),
                message: err.user_message().to_string(),
                retryable: err.is_retryable(),
            },
        }
    }
}

/// Drives one ticker at a time through the provider
pub struct TickerSession {
    provider: AnalysisProvider,
    state: watch::Sender<SessionState>,
}

impl TickerSession {
    pub fn new(provider: AnalysisProvider) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self { provider, state }
    }

    pub fn provider(&self) -> &AnalysisProvider {
        &self.provider
    }

    /// Snapshot of the current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every subsequent state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Resolve a ticker and settle in `Ready` or `Failed`
    ///
    /// Any previous result or error is cleared first. A submit that overlaps
    /// another still in flight is allowed; whichever finishes last sets the
    /// final state.
    pub async fn submit(&self, ticker: &str) -> SessionState {
        let ticker = normalize_ticker(ticker);
        self.transition(SessionState::Resolving {
            ticker: ticker.clone(),
        });

        let outcome = self.provider.resolve(&ticker).await;
        let next = SessionState::from_outcome(ticker, outcome);
        self.transition(next.clone());
        next
    }

    /// Return to `Idle` from any state
    pub fn reset(&self) {
        self.transition(SessionState::Idle);
    }

    fn transition(&self, next: SessionState) {
        let label = match &next {
            SessionState::Idle => "idle",
            SessionState::Resolving { .. } => "resolving",
            SessionState::Ready { .. } => "ready",
            SessionState::Failed { .. } => "failed",
        };
        info!(state = label, ticker = next.ticker().unwrap_or_default(), "Session transition");
        self.state.send_replace(next);
    }
}
