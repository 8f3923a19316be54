//! Logging setup
//!
//! Console only, written to stderr so command output on stdout stays
//! machine-readable.

use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init_logger(level: &str, json_format: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry();

    if json_format {
        let console_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .with_filter(env_filter);
        subscriber.with(console_layer).init();
    } else {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(std::io::stderr)
            .with_filter(env_filter);
        subscriber.with(console_layer).init();
    }
}
