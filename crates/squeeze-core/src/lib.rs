//! Agentic-squeeze exposure analysis
//!
//! Scores how exposed a public company is to agentic AI across five
//! disruption zones and classifies it as COOKED, CONTESTED or ROCKET.
//! It includes:
//!
//! - A bundled knowledge base of pre-authored analyses
//! - A validator that repairs untrusted model output into well-formed analyses
//! - An analysis provider backed by a session store and a model client
//! - Observable single-ticker and portfolio sessions
//!
//! # Architecture
//!
//! [`AnalysisProvider`] resolves a ticker from the [`AnalysisStore`] (seeded
//! from the [`KnowledgeBase`]) and falls back to a [`ModelClient`] on a miss.
//! Every model reply goes through [`validator::validate`] before it is
//! stored. [`TickerSession`] and [`PortfolioSession`] wrap the provider in
//! state machines published over `tokio::sync::watch`.
//!
//! # Example
//!
//! ```rust,ignore
//! use squeeze_core::{AnalysisProvider, SqueezeConfig, TickerSession};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SqueezeConfig::from_env()?;
//!     let session = TickerSession::new(AnalysisProvider::from_config(&config)?);
//!
//!     let state = session.submit("CRM").await;
//!     if let Some(analysis) = state.analysis() {
//!         println!("{} {}", analysis.verdict().icon(), analysis.verdict());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod knowledge_base;
pub mod portfolio;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod store;
pub mod validator;
pub mod zones;

// Re-export main types for convenience
pub use analysis::{Analysis, PortfolioSynthesis, Verdict};
pub use client::{LlmModelClient, ModelClient, ModelRequest, RequestPurpose};
pub use config::SqueezeConfig;
pub use error::{ConfigError, PortfolioError, ProviderError, ProviderErrorKind, Result, SchemaError};
pub use knowledge_base::{KnowledgeBase, normalize_ticker};
pub use portfolio::{
    PortfolioOrchestrator, PortfolioReport, PortfolioSession, PortfolioState, ProgressEvent,
    SynthesisOutcome,
};
pub use provider::{AnalysisProvider, AnalysisSource, Resolution};
pub use session::{SessionState, TickerSession};
pub use store::{AnalysisStore, Suggestion};
pub use zones::{Effect, ZoneExposure, ZoneKey, Zones};
