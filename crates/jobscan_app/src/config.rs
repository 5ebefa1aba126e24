use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use jobscan_core::{
    CoreSettings, PositivePolicy, DEFAULT_MAX_POLL_FAILURES, DEFAULT_SCAN_LIMIT, MAX_SCAN_LIMIT,
};
use jobscan_engine::{BackendSettings, SessionConfig, Timing};
use jobscan_logging::jobscan_warn;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILENAME: &str = "jobscan.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("unknown log level `{0}`")]
    LogLevel(String),
    #[error("scan_limit {0} is outside 1..={max}", max = MAX_SCAN_LIMIT)]
    ScanLimit(u32),
}

/// Host settings read from the RON config file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub scan_limit: u32,
    /// `None` keeps polling through any number of failed checks.
    pub max_consecutive_poll_failures: Option<u32>,
    pub include_referred: bool,
    pub poll_interval_ms: u64,
    pub health_retry_delay_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            scan_limit: DEFAULT_SCAN_LIMIT,
            max_consecutive_poll_failures: Some(DEFAULT_MAX_POLL_FAILURES),
            include_referred: false,
            poll_interval_ms: 3_000,
            health_retry_delay_ms: 4_000,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            log_level: "info".to_string(),
            log_file: PathBuf::from("./jobscan.log"),
        }
    }
}

impl AppConfig {
    /// Picks the config file: `explicit` if given, otherwise `./jobscan.ron`
    /// when it exists.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILENAME);
                path.exists().then(|| path.to_path_buf())
            }
        }
    }

    /// Reads `path`, or returns the defaults when there is no file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_SCAN_LIMIT).contains(&self.scan_limit) {
            return Err(ConfigError::ScanLimit(self.scan_limit));
        }
        Ok(())
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn backend_settings(&self) -> BackendSettings {
        let mut settings = BackendSettings::new(self.backend_url.clone());
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        settings
    }

    pub fn session_config(&self) -> SessionConfig {
        if self.poll_interval_ms == 0 {
            jobscan_warn!("poll_interval_ms is 0, using 1 ms");
        }
        SessionConfig {
            core: CoreSettings {
                scan_limit: self.scan_limit,
                max_consecutive_poll_failures: self.max_consecutive_poll_failures,
                positive: PositivePolicy {
                    include_referred: self.include_referred,
                },
            },
            timing: Timing {
                poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
                health_retry_delay: Duration::from_millis(self.health_retry_delay_ms),
            },
        }
    }
}
