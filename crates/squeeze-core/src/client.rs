//! External model client
//!
//! [`ModelClient`] is the seam between the analysis pipeline and whatever
//! produces raw model text. [`LlmModelClient`] is the production
//! implementation on top of an [`LLMProvider`].

use crate::config::SqueezeConfig;
use crate::error::{ConfigError, ProviderError};
use crate::prompts::PROMPT_VERSION;
use async_trait::async_trait;
use squeeze_llm::providers::AnthropicProvider;
use squeeze_llm::{CompletionRequest, LLMProvider, Message};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// What a model request is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPurpose {
    Analysis,
    Synthesis,
}

impl fmt::Display for RequestPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analysis => f.write_str("analysis"),
            Self::Synthesis => f.write_str("synthesis"),
        }
    }
}

/// One prompt for the model: a fixed system instruction and a user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRequest {
    pub purpose: RequestPurpose,
    pub system: String,
    pub user: String,
}

impl ModelRequest {
    pub fn new(purpose: RequestPurpose, system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            purpose,
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Sends a prompt to a text-generation service and returns the raw reply
///
/// Implementations report transport problems as [`ProviderError::Network`]
/// or [`ProviderError::Timeout`]; they never interpret the reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, request: ModelRequest) -> Result<String, ProviderError>;
}

/// [`ModelClient`] backed by an [`LLMProvider`], with a hard timeout per call
pub struct LlmModelClient {
    provider: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: usize,
    timeout: Duration,
}

impl LlmModelClient {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        model: impl Into<String>,
        max_tokens: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
            timeout,
        }
    }

    /// Build an Anthropic-backed client, or `None` when no API key is configured
    pub fn from_config(config: &SqueezeConfig) -> Result<Option<Self>, ConfigError> {
        let Some(api_key) = config.api_key.as_deref().filter(|_| config.has_credential()) else {
            return Ok(None);
        };

        let provider =
            AnthropicProvider::with_config(api_key, &config.api_base, config.request_timeout)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(Some(Self::new(
            Arc::new(provider),
            &config.model,
            config.max_tokens,
            config.request_timeout,
        )))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelClient for LlmModelClient {
    #[instrument(
        skip(self, request),
        fields(provider = self.provider.name(), purpose = %request.purpose, prompt_version = PROMPT_VERSION)
    )]
    async fn generate(&self, request: ModelRequest) -> Result<String, ProviderError> {
        let completion = CompletionRequest::builder(&self.model)
            .system(request.system)
            .add_message(Message::user(request.user))
            .max_tokens(self.max_tokens)
            .build();

        let response = match tokio::time::timeout(self.timeout, self.provider.complete(completion)).await {
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Model request timed out");
                return Err(ProviderError::Timeout(self.timeout));
            }
            Ok(Err(e)) if e.is_timeout() => {
                warn!(timeout_secs = self.timeout.as_secs(), "Model transport timed out");
                return Err(ProviderError::Timeout(self.timeout));
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Model request failed");
                return Err(e.into());
            }
            Ok(Ok(response)) => response,
        };

        let text = response.message.joined_text();
        if response.stop_reason.is_truncated() {
            warn!(max_tokens = self.max_tokens, "Model reply hit the token limit");
        }
        debug!(
            chars = text.len(),
            output_tokens = response.usage.output_tokens,
            "Model reply received"
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squeeze_llm::{
        CompletionResponse, ContentBlock, LLMError, MessageContent, Role, StopReason, TokenUsage,
    };

    /// Provider that answers with fixed text after an optional delay
    struct CannedProvider {
        reply: std::result::Result<&'static str, fn() -> LLMError>,
        delay: Duration,
        stop_reason: StopReason,
    }

    impl CannedProvider {
        fn text(reply: &'static str) -> Self {
            Self {
                reply: Ok(reply),
                delay: Duration::ZERO,
                stop_reason: StopReason::EndTurn,
            }
        }
    }

    /// Shared buffer a test subscriber writes formatted events into
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn complete(&self, request: CompletionRequest) -> squeeze_llm::Result<CompletionResponse> {
            assert_eq!(request.messages.len(), 1);
            tokio::time::sleep(self.delay).await;
            let text = self.reply.map_err(|make| make())?;
            Ok(CompletionResponse {
                message: Message {
                    role: Role::Assistant,
                    content: Some(MessageContent::Blocks(vec![ContentBlock::Text {
                        text: text.to_string(),
                    }])),
                },
                stop_reason: self.stop_reason,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &'static str {
            "canned"
        }
    }

    fn client(provider: CannedProvider, timeout: Duration) -> LlmModelClient {
        LlmModelClient::new(Arc::new(provider), "test-model", 1000, timeout)
    }

    fn request() -> ModelRequest {
        ModelRequest::new(RequestPurpose::Analysis, "system", "Analyze ticker: ZZZZ")
    }

    #[tokio::test]
    async fn test_returns_joined_text() {
        let client = client(CannedProvider::text("{\"name\": \"Zeta\"}"), Duration::from_secs(1));
        let text = client.generate(request()).await.unwrap();
        assert_eq!(text, "{\"name\": \"Zeta\"}");
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let client = client(
            CannedProvider {
                delay: Duration::from_millis(200),
                ..CannedProvider::text("{}")
            },
            Duration::from_millis(20),
        );
        let err = client.generate(request()).await.unwrap_err();
        assert_eq!(err, ProviderError::Timeout(Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_provider_errors_are_classified() {
        let client = client(
            CannedProvider {
                reply: Err(|| LLMError::RequestFailed("HTTP 500".into())),
                ..CannedProvider::text("")
            },
            Duration::from_secs(1),
        );
        let err = client.generate(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Network(_)));
    }

    #[tokio::test]
    async fn test_request_span_carries_prompt_version() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = client(CannedProvider::text("{}"), Duration::from_secs(1));
        client.generate(request()).await.unwrap();

        let output = logs.contents();
        assert!(output.contains("Model reply received"), "{output}");
        assert!(output.contains("prompt_version"), "{output}");
        assert!(output.contains(PROMPT_VERSION), "{output}");
        assert!(output.contains("purpose=analysis"), "{output}");
    }

    #[tokio::test]
    async fn test_truncated_reply_is_returned_with_warning() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let client = client(
            CannedProvider {
                stop_reason: StopReason::MaxTokens,
                ..CannedProvider::text("{\"name\": \"Ze")
            },
            Duration::from_secs(1),
        );
        let text = client.generate(request()).await.unwrap();

        assert_eq!(text, "{\"name\": \"Ze");
        assert!(logs.contents().contains("Model reply hit the token limit"));
    }

    #[test]
    fn test_from_config_without_key() {
        let config = SqueezeConfig::default();
        assert!(LlmModelClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_with_key() {
        let config = SqueezeConfig::builder()
            .api_key("sk-test")
            .model("claude-test")
            .build()
            .unwrap();
        let client = LlmModelClient::from_config(&config).unwrap().unwrap();
        assert_eq!(client.model(), "claude-test");
    }
}
