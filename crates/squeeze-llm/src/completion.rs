//! Single-turn completion request and response types

use crate::Message;
use serde::{Deserialize, Serialize};

/// Default cap on output tokens when the caller sets none
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// One prompt sent to a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Provider-specific model identifier
    pub model: String,

    /// Conversation turns, oldest first
    pub messages: Vec<Message>,

    /// Fixed instruction sent alongside the turns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: usize,
}

/// What a provider sent back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The assistant turn
    pub message: Message,

    pub stop_reason: StopReason,

    pub usage: TokenUsage,
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,

    /// Output was cut at `max_tokens`
    MaxTokens,

    StopSequence,

    /// Any reason this crate does not distinguish
    #[serde(other)]
    Other,
}

impl StopReason {
    /// Map a provider's wire value
    pub fn from_wire(value: Option<&str>) -> Self {
        match value {
            None | Some("end_turn") => Self::EndTurn,
            Some("max_tokens") => Self::MaxTokens,
            Some("stop_sequence") => Self::StopSequence,
            Some(_) => Self::Other,
        }
    }

    /// Whether the reply may be incomplete
    pub fn is_truncated(self) -> bool {
        matches!(self, Self::MaxTokens)
    }
}

/// Tokens billed for one request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

impl TokenUsage {
    pub fn total(&self) -> usize {
        self.input_tokens + self.output_tokens
    }
}

impl CompletionRequest {
    /// Start building a request for `model`
    pub fn builder(model: impl Into<String>) -> CompletionRequestBuilder {
        CompletionRequestBuilder::new(model)
    }
}

/// Builder for [`CompletionRequest`]
pub struct CompletionRequestBuilder {
    request: CompletionRequest,
}

impl CompletionRequestBuilder {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            request: CompletionRequest {
                model: model.into(),
                messages: Vec::new(),
                system: None,
                max_tokens: DEFAULT_MAX_TOKENS,
            },
        }
    }

    /// Append a turn
    pub fn add_message(mut self, message: Message) -> Self {
        self.request.messages.push(message);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.request.system = Some(system.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.request.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> CompletionRequest {
        self.request
    }
}
