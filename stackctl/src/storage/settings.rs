//! Settings file management

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::deploy::policy::DEFAULT_QUERY_RETRIES;
use crate::errors::StackError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Settings file used when `--settings` is not given
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/stackctl/settings.json";

/// stackctl settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,

    /// Orchestration service endpoint
    #[serde(default)]
    pub endpoint: EndpointSettings,

    /// Polling defaults
    #[serde(default)]
    pub polling: PollingSettings,
}

impl Settings {
    /// Load settings from `path`, or from the default location if it exists.
    ///
    /// An explicitly given file must exist; a missing default file yields
    /// built-in defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self, StackError> {
        let (file, required) = match path {
            Some(path) => (File::new(path), true),
            None => (File::new(DEFAULT_SETTINGS_PATH), false),
        };

        if !required && !file.exists().await {
            debug!("No settings file at {}, using defaults", file.path().display());
            return Ok(Self::default());
        }

        file.read_json::<Settings>().await.map_err(|e| {
            StackError::ConfigError(format!(
                "Unable to read settings file {}: {}",
                file.path().display(),
                e
            ))
        })
    }
}

/// Orchestration service endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Base URL for the service API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Polling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingSettings {
    /// Seconds between event stream queries
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Seconds to wait for a terminal status
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries of a failed query within one attempt
    #[serde(default = "default_query_retries")]
    pub query_retries: u32,
}

fn default_interval() -> u64 {
    10
}

fn default_timeout() -> u64 {
    1800
}

fn default_query_retries() -> u32 {
    DEFAULT_QUERY_RETRIES
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            timeout_secs: default_timeout(),
            query_retries: default_query_retries(),
        }
    }
}
