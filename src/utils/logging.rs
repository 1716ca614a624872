use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Default level for a CLI verbosity count.
///
/// 0 -> warn, 1 (-v) -> info, 2 (-vv) -> debug, 3+ -> trace.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing from the CLI verbosity count.
///
/// `RUST_LOG` overrides the flag when set. Events always go to stderr; with a
/// log file the same events are also written there without ANSI colours.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let level = level_for(verbosity);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("weather_qaqc={level}")));

    let file_layer = match log_file {
        Some(path) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(File::create(path)?)),
        ),
        None => None,
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();

    // Tests and embedding hosts may have installed a subscriber already
    if let Err(e) = installed {
        debug!(error = %e, "Keeping the existing tracing subscriber");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(2), "debug");
        assert_eq!(level_for(3), "trace");
        assert_eq!(level_for(9), "trace");
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("qaqc.log");

        init(1, Some(&path)).unwrap();
        assert!(path.exists());

        // a second initialization keeps the first subscriber
        init(0, None).unwrap();
    }

    #[test]
    fn test_init_fails_for_unwritable_log_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("qaqc.log");
        assert!(init(0, Some(&path)).is_err());
    }
}
