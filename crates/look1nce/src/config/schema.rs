use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gateway::ApiBase;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the service base URL.
pub const API_URL_ENV: &str = "LOOK1NCE_API_URL";

/// Environment variable overriding the request timeout in seconds.
pub const REQUEST_TIMEOUT_ENV: &str = "LOOK1NCE_REQUEST_TIMEOUT_SECS";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the try-on service.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Upper bound per request. Synthesis alone can take 30 seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Cadence of the progress narration during synthesis.
    #[serde(default = "default_narration_interval_ms")]
    pub narration_interval_ms: u64,

    /// Buffer size of the wizard event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_narration_interval_ms() -> u64 {
    2000
}

fn default_event_capacity() -> usize {
    64
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            narration_interval_ms: default_narration_interval_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ClientConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// Applies `LOOK1NCE_API_URL` and `LOOK1NCE_REQUEST_TIMEOUT_SECS` if set.
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(url) = read_env(API_URL_ENV)? {
            self.api_base_url = url;
        }
        if let Some(raw) = read_env(REQUEST_TIMEOUT_ENV)? {
            self.request_timeout_secs = raw.parse().map_err(|_| ConfigError::Validation {
                message: format!("{} must be a number of seconds, got '{}'", REQUEST_TIMEOUT_ENV, raw),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_base()?;
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                message: "connectTimeoutSecs must be greater than zero".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation {
                message: "requestTimeoutSecs must be greater than zero".to_string(),
            });
        }
        if self.narration_interval_ms == 0 {
            return Err(ConfigError::Validation {
                message: "narrationIntervalMs must be greater than zero".to_string(),
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Validation {
                message: "eventCapacity must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn api_base(&self) -> Result<ApiBase, ConfigError> {
        ApiBase::parse(&self.api_base_url).map_err(|reason| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn narration_interval(&self) -> Duration {
        Duration::from_millis(self.narration_interval_ms)
    }
}

fn read_env(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::Validation {
            message: format!("environment variable '{}' contains invalid UTF-8", name),
        }),
    }
}
