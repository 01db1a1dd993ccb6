use std::env::var;
use std::io::stderr;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing at `INFO`, overridable through `RUST_LOG`
pub fn init() {
    init_with_level(LevelFilter::INFO);
}

/// Initialize tracing with the given default level.
///
/// `RUST_LOG` still takes precedence. `RUST_LOG_FORMAT=json` switches to
/// one JSON object per line. Output goes to stderr so stdout stays free for
/// command output. Calling this twice is a no-op.
pub fn init_with_level(level: LevelFilter) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer().json().with_writer(stderr).with_filter(env_filter).boxed(),
        _ => tracing_subscriber::fmt::layer()
            .with_writer(stderr)
            .compact()
            .without_time()
            .with_filter(env_filter)
            .boxed(),
    };

    if tracing_subscriber::registry().with(log_layer).try_init().is_err() {
        return;
    }

    if !matches!(log_format.as_str(), "" | "json" | "compact") {
        warn!("Unknown RUST_LOG_FORMAT {log_format:?}, falling back to compact");
    }
}
