//! Diagnostic tracing for the tutor binary.
//!
//! Tracing output goes to stderr and is controlled by `RUST_LOG`. Tutor
//! responses are plain text on stdout and never pass through the subscriber.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// Defaults to `warn` when `RUST_LOG` is unset, so state regeneration and
/// skipped tutorials still surface.
///
/// # Example
/// ```bash
/// RUST_LOG=tutor=debug tutor status
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
