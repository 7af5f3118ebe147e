//! Logging setup for the command-line tool.

use crate::error::{AesboxError, ErrorCategory, ErrorKind, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the verbosity flags, using
/// `tracing_subscriber` filter syntax (for example `aesbox=debug`).
pub const LOG_ENV: &str = "AESBOX_LOG";

/// Install a stderr `fmt` subscriber.
///
/// `verbosity` is the number of `-v` flags: 0 = warn, 1 = info, 2 = debug,
/// 3+ = trace. `AESBOX_LOG` takes precedence when set.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| {
            AesboxError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InternalInvariant,
                format!("failed to initialise logging: {}", e),
            )
        })
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
