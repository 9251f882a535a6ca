//! Structured logging configuration.
//!
//! The library logs through the `log` facade; installing the subscriber here
//! also captures those records.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Initialize logging to stderr, configurable via the `RUST_LOG` env var
///
/// # Example
///
/// ```no_run
/// use ph_client::logging;
///
/// logging::init();
/// tracing::info!("Client starting");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}
