//! Logging and tracing utilities

use crate::config::{LogConfig, LogFormat};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(&LogConfig::default());
}

/// Initialize tracing subscriber from a [`LogConfig`]
///
/// `RUST_LOG` still takes precedence over `config.level`. Output goes to
/// stderr so stdout stays free for command output. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing_with(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let _ = match config.format {
        LogFormat::Plain => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
}
