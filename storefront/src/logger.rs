//! Logging Infrastructure
//!
//! Structured logging via `tracing-subscriber`, filtered by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "storefront=info,tower_http=info";

/// Initialize the global logger
///
/// `json` switches to single-line JSON records for log shipping.
pub fn init_logger(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // A second init (tests, embedding) keeps the first subscriber
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        tracing::debug!("Logger already initialized: {e}");
    }
}
