//! Configuration for analysis acquisition

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use squeeze_llm::providers::anthropic::ANTHROPIC_API_BASE;
use std::fmt;
use std::time::Duration;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Configuration for analysis acquisition
#[derive(Clone, Serialize, Deserialize)]
pub struct SqueezeConfig {
    /// Model API key; `None` disables live analysis
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier sent with every request
    pub model: String,

    /// Maximum output tokens per request
    pub max_tokens: usize,

    /// Upper bound on a single model call
    pub request_timeout: Duration,

    /// Base URL of the Messages API
    pub api_base: String,

    /// Fewest tickers a portfolio may contain
    pub min_portfolio: usize,

    /// Most tickers a portfolio may contain
    pub max_portfolio: usize,

    /// Longest token accepted as a ticker in portfolio input
    pub max_ticker_len: usize,
}

impl Default for SqueezeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            request_timeout: Duration::from_secs(30),
            api_base: ANTHROPIC_API_BASE.to_string(),
            min_portfolio: 2,
            max_portfolio: 15,
            max_ticker_len: 6,
        }
    }
}

impl fmt::Debug for SqueezeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqueezeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout", &self.request_timeout)
            .field("api_base", &self.api_base)
            .field("min_portfolio", &self.min_portfolio)
            .field("max_portfolio", &self.max_portfolio)
            .field("max_ticker_len", &self.max_ticker_len)
            .finish()
    }
}

impl SqueezeConfig {
    pub const API_KEY_VAR: &'static str = "ANTHROPIC_API_KEY";
    pub const MODEL_VAR: &'static str = "SQUEEZE_MODEL";
    pub const API_BASE_VAR: &'static str = "SQUEEZE_API_BASE";
    pub const TIMEOUT_VAR: &'static str = "SQUEEZE_TIMEOUT_SECS";

    /// Create a new configuration builder
    pub fn builder() -> SqueezeConfigBuilder {
        SqueezeConfigBuilder::default()
    }

    /// Defaults with overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults with overrides from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(key) = present(Self::API_KEY_VAR) {
            builder = builder.api_key(key.trim());
        }
        if let Some(model) = present(Self::MODEL_VAR) {
            builder = builder.model(model.trim());
        }
        if let Some(base) = present(Self::API_BASE_VAR) {
            builder = builder.api_base(base.trim());
        }
        if let Some(secs) = present(Self::TIMEOUT_VAR) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a whole number of seconds", Self::TIMEOUT_VAR))
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        builder.build()
    }

    /// Whether live model analysis is possible
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::Invalid("model must not be empty".to_string()));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        url::Url::parse(&self.api_base)
            .map_err(|e| ConfigError::Invalid(format!("api_base is not a URL: {e}")))?;

        if self.min_portfolio == 0 || self.min_portfolio > self.max_portfolio {
            return Err(ConfigError::Invalid(format!(
                "portfolio bounds {}..={} are not a valid range",
                self.min_portfolio, self.max_portfolio
            )));
        }

        if self.max_ticker_len == 0 {
            return Err(ConfigError::Invalid(
                "max_ticker_len must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for SqueezeConfig
#[derive(Debug, Default)]
pub struct SqueezeConfigBuilder {
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<usize>,
    request_timeout: Option<Duration>,
    api_base: Option<String>,
    min_portfolio: Option<usize>,
    max_portfolio: Option<usize>,
    max_ticker_len: Option<usize>,
}

impl SqueezeConfigBuilder {
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }

    /// Set both portfolio size bounds
    pub fn portfolio_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_portfolio = Some(min);
        self.max_portfolio = Some(max);
        self
    }

    pub fn max_ticker_len(mut self, len: usize) -> Self {
        self.max_ticker_len = Some(len);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SqueezeConfig> {
        let defaults = SqueezeConfig::default();

        let config = SqueezeConfig {
            api_key: self.api_key,
            model: self.model.unwrap_or(defaults.model),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            api_base: self.api_base.unwrap_or(defaults.api_base),
            min_portfolio: self.min_portfolio.unwrap_or(defaults.min_portfolio),
            max_portfolio: self.max_portfolio.unwrap_or(defaults.max_portfolio),
            max_ticker_len: self.max_ticker_len.unwrap_or(defaults.max_ticker_len),
        };

        config.validate()?;
        Ok(config)
    }
}
