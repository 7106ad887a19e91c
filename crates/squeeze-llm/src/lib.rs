//! LLM provider abstraction layer for squeeze
//!
//! This crate provides provider-agnostic abstractions for talking to a
//! text-generation API. It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Provider trait for LLM implementations
//! - The Anthropic Messages API provider (behind the `anthropic` feature)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "anthropic")]
pub mod providers;
