//! Shared utilities for the squeeze workspace
//!
//! Logging setup and the small amount of environment-driven configuration
//! every binary in the workspace needs.

pub mod config;
pub mod logging;

pub use config::{ConfigError, LogConfig, LogFormat};
pub use logging::{init_tracing, init_tracing_with};
