use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::game::DEFAULT_DURATION_SECS;
use crate::word_source::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_WORD_COUNT, DEFAULT_WORD_SOURCE_URL};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub duration_secs: u32,
    pub word_count: usize,
    pub word_source_url: String,
    pub fetch_timeout_secs: u64,
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            word_count: DEFAULT_WORD_COUNT,
            word_source_url: DEFAULT_WORD_SOURCE_URL.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            offline: false,
        }
    }
}

impl Config {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Replace zero durations and counts with the defaults.
    ///
    /// Holds the file to the same lower bounds the command line enforces.
    pub fn validated(mut self) -> Self {
        let defaults = Config::default();
        if self.duration_secs == 0 {
            warn!("duration_secs must be at least 1, using default");
            self.duration_secs = defaults.duration_secs;
        }
        if self.word_count == 0 {
            warn!("word_count must be at least 1, using default");
            self.word_count = defaults.word_count;
        }
        if self.fetch_timeout_secs == 0 {
            warn!("fetch_timeout_secs must be at least 1, using default");
            self.fetch_timeout_secs = defaults.fetch_timeout_secs;
        }
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keyrush_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg.validated(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
