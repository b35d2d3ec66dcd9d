//! Tracing setup
//!
//! The interface owns the terminal, so interactive runs log to a file in the
//! cache directory. `--once` runs log to stderr. `RUST_LOG` overrides the
//! default `info` level.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name inside the cache directory
pub const LOG_FILE_NAME: &str = "meteopanel.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Logs to stderr
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

/// Logs to [`LOG_FILE_NAME`] in `dir`, appending
///
/// Returns the log file path.
pub fn init_file(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_file_creates_log_in_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("logs");

        let path = init_file(&dir).expect("Log file should be created");

        assert_eq!(path, dir.join(LOG_FILE_NAME));
        assert!(path.exists());
    }
}
