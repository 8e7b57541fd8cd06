//! Logging setup: structured `tracing` events on stderr, stdout stays for diagnostics.

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Env var consulted when no level flag is given.
pub const LOG_LEVEL_ENV: &str = "BUILDGATE_LOG_LEVEL";

/// Pick the level: explicit `--log-level`, then `-v`/`-q`, then the environment, then `info`.
pub fn resolve_level(log_level: Option<&str>, verbose: bool, quiet: bool) -> Level {
    if let Some(level) = log_level {
        parse_level(level)
    } else if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        let level = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
        parse_level(&level)
    }
}

pub fn parse_level(level: &str) -> Level {
    match level.to_ascii_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "invalid log level '{level}', using info (expected trace, debug, info, warn, error)"
            );
            Level::INFO
        }
    }
}

/// Install the subscriber once. `RUST_LOG`, when set, wins over `level`.
pub fn init_logging(level: Level) {
    INIT.call_once(|| {
        let filter = match env::var("RUST_LOG") {
            Ok(_) => EnvFilter::from_default_env(),
            Err(_) => EnvFilter::new(format!("warn,buildgate={level}")),
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    });
}
