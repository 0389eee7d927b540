//! Logging Infrastructure

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "storefront_server=info,tower_http=info";

/// `LOG_JSON=true` (or `1`) switches to JSON lines
pub fn json_from_env() -> bool {
    crate::util::is_truthy(std::env::var("LOG_JSON").ok().as_deref())
}

/// Initialize the global subscriber
///
/// `RUST_LOG` overrides the default filter. Calling this twice is harmless:
/// the second installation attempt is ignored.
pub fn init_logger(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("logger already initialised: {e}");
    }
}
