//! File logging. The terminal belongs to the TUI, so nothing is ever written
//! to stdout or stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::app_dirs::AppDirs;

/// Environment variable holding the filter directives, e.g. `keyrush=debug`.
pub const LOG_ENV: &str = "KEYRUSH_LOG";

/// Install the global subscriber writing to the state-dir log file.
///
/// Returns false when logging stays disabled (no state dir, unwritable file,
/// or a subscriber already installed).
pub fn init() -> bool {
    match AppDirs::log_path() {
        Some(path) => init_at(&path),
        None => false,
    }
}

pub fn init_at(path: &Path) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true)
        .try_init()
        .is_ok()
}
