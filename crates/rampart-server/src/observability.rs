//! Tracing set-up with a log level that can be changed after start-up.
use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static FILTER_HANDLE: OnceLock<FilterHandle> = OnceLock::new();

/// Connection libraries log every pool event at debug level.
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "deadpool=warn", "redis=warn"];

pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Installs the global subscriber. `RUST_LOG`, when set, wins over `level`.
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for(level));

    let (filter_layer, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Switches to the configured `logging.level`. No-op under `RUST_LOG` or
/// before [`init_tracing`].
pub fn apply_logging_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    if let Some(handle) = FILTER_HANDLE.get() {
        if let Err(e) = handle.reload(filter_for(level)) {
            tracing::warn!(error = %e, level, "failed to apply logging level");
        } else {
            tracing::debug!(level, "logging level applied");
        }
    }
}

fn filter_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    if level == "off" {
        return level;
    }
    std::iter::once(level.as_str())
        .chain(QUIET_TARGETS.iter().copied())
        .collect::<Vec<_>>()
        .join(",")
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::new(filter_directives(level))
}
