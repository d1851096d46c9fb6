//! Logging Configuration
//!
//! Installs a `tracing` fmt subscriber on stderr. Records emitted by the core
//! through the `log` facade are bridged into it.

use sovereign_core::infrastructure::config::ENV_LOG_LEVEL;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// `configured` already carries the environment override (see
/// `ClientConfig::apply_env_overrides`). `verbose` wins over both.
pub fn resolve_level(configured: Option<&str>, verbose: bool) -> LevelFilter {
    if verbose {
        return LevelFilter::DEBUG;
    }
    match configured {
        Some(value) => parse_log_level(value).unwrap_or_else(|| {
            eprintln!(
                "Warning: Invalid log level '{}' (config or {}), falling back to default",
                value, ENV_LOG_LEVEL
            );
            DEFAULT_LEVEL
        }),
        None => DEFAULT_LEVEL,
    }
}

pub fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy("");

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
    {
        eprintln!("Warning: Failed to install log subscriber: {}", e);
    }
}
