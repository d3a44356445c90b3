//! Log setup.
//!
//! The interactive view owns the terminal, so it always logs to a file.
//! One-shot commands log to stderr unless `--log-file` is given.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Log file name inside the data directory.
pub const LOG_FILE_NAME: &str = "kinema.log";

/// Where the interactive view logs by default.
pub fn default_log_path() -> Option<PathBuf> {
    ProjectDirs::from("rs", "kinema", "kinema").map(|dirs| dirs.data_dir().join(LOG_FILE_NAME))
}

/// Default filter directive for a `-v` count.
pub const fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Builds the filter: `RUST_LOG` wins, otherwise the `-v` level.
pub fn filter(verbose: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose)))
}

fn open(path: &Path) -> anyhow::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}

/// Installs the global subscriber.
///
/// Logs go to `file` when given, otherwise to stderr.
///
/// # Errors
///
/// Fails if the log file cannot be opened.
pub fn init(verbose: u8, file: Option<&Path>) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false);

    let installed = match file {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(open(path)?))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    // A subscriber may already be installed (tests); keep it.
    if let Err(err) = installed {
        tracing::debug!(%err, "subscriber already installed");
    }
    Ok(())
}
