//! Logging setup shared by every Aguita host.
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! always wins over the level picked by the host.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize logging at the default level (warn).
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging from a verbosity count (`-v` flags).
///
/// 0 → warn, 1 → info, 2 → debug, 3+ → trace
pub fn init_with_verbosity(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    init_with_level(level)
}

/// Initialize logging with a specific default level.
///
/// Only the first call installs a subscriber; later calls are ignored.
pub fn init_with_level(default_level: &str) {
    INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let installed = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init();

        if installed.is_err() {
            // Someone else already owns the global subscriber
            tracing::debug!("Global subscriber already set; keeping it");
        }
    });
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_does_not_panic() {
        init_test();
        init_with_verbosity(2);
        init();
        tracing::info!("still logging");
    }
}
