//! Error types for analysis acquisition

use serde::{Deserialize, Serialize};
use squeeze_llm::LLMError;
use std::time::Duration;
use thiserror::Error;

/// Generic retry message shown for every transient failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Could not analyze this ticker. It might not be a recognized public company, or the AI had trouble. Try again?";

/// Message shown when no model credential is configured
pub const NO_CREDENTIAL_MESSAGE: &str = "Set ANTHROPIC_API_KEY to enable AI analysis. Pre-analyzed tickers still work without a key.";

/// Notice attached to a portfolio whose synthesis step did not complete
pub const SYNTHESIS_FAILURE_MESSAGE: &str =
    "Portfolio synthesis failed — individual results are shown below.";

/// A payload too malformed to be repaired into an analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Payload is not shaped like an analysis: {reason}")]
pub struct SchemaError {
    /// What made the payload unrepairable
    pub reason: String,
}

impl SchemaError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Classification of a failed ticker resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    Network,
    Malformed,
    NoCredential,
    Timeout,
}

/// Failure to resolve a ticker into an analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Transport failure or non-success status from the model API
    #[error("Network error: {0}")]
    Network(String),

    /// The model answered, but not with a usable analysis
    #[error("Malformed model response: {0}")]
    Malformed(String),

    /// No model client is configured
    #[error("No model credential configured")]
    NoCredential,

    /// The model call did not finish in time
    #[error("Model request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

impl ProviderError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::Network(_) => ProviderErrorKind::Network,
            Self::Malformed(_) => ProviderErrorKind::Malformed,
            Self::NoCredential => ProviderErrorKind::NoCredential,
            Self::Timeout(_) => ProviderErrorKind::Timeout,
        }
    }

    /// Text suitable for showing to the user
    ///
    /// Only a missing credential gets its own copy; every other kind shares
    /// the generic retry message.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoCredential => NO_CREDENTIAL_MESSAGE,
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }

    /// Whether resubmitting the same ticker might succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NoCredential)
    }
}

impl From<SchemaError> for ProviderError {
    fn from(err: SchemaError) -> Self {
        Self::Malformed(err.reason)
    }
}

impl From<LLMError> for ProviderError {
    fn from(err: LLMError) -> Self {
        if err.is_transport() {
            Self::Network(err.to_string())
        } else {
            match err {
                LLMError::ConfigurationError(_) => Self::NoCredential,
                other => Self::Malformed(other.to_string()),
            }
        }
    }
}

/// Rejected portfolio input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PortfolioError {
    /// Fewer tickers than the minimum
    #[error("Enter at least {min} tickers to analyze a portfolio")]
    TooFew { count: usize, min: usize },

    /// More tickers than the maximum
    #[error("Maximum {max} tickers per portfolio analysis")]
    TooMany { count: usize, max: usize },
}

impl PortfolioError {
    /// Number of tickers the input contained
    pub fn count(&self) -> usize {
        match self {
            Self::TooFew { count, .. } | Self::TooMany { count, .. } => *count,
        }
    }
}

/// Invalid configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Knowledge base could not be loaded: {0}")]
    KnowledgeBase(String),
}

/// Result type alias for configuration and setup
pub type Result<T> = std::result::Result<T, ConfigError>;
