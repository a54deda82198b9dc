use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::media::MediaError;
use crate::wizard::WizardError;

#[derive(Error, Debug)]
pub enum TryOnError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl TryOnError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TryOnError::Config(_) | TryOnError::Logging(_) => ErrorKind::Config,
            TryOnError::Media(e) => e.kind(),
            TryOnError::Gateway(e) => e.kind(),
            TryOnError::Wizard(e) => e.kind(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Classification of failures as presented to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Submission without an image; never reaches the service.
    MissingInput,
    /// Selected file is not an image.
    InvalidMediaKind,
    /// Camera is open but has no frame yet.
    NoFrameAvailable,
    /// Camera access denied or lost.
    DeviceUnavailable,
    /// Service rejected the request (4xx).
    UpstreamRejected,
    /// Service unreachable or failing (network, 5xx, unusable response).
    UpstreamUnavailable,
    /// Action not valid in the current wizard state.
    InvalidAction,
    /// A backend call is already in flight.
    CallOutstanding,
    /// The workflow was reset while the call was in flight.
    Superseded,
    /// Internal invariant breach; a defect, not a user condition.
    PreconditionViolation,
    /// Local file or configuration problem.
    Config,
}

impl MediaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaError::InvalidMediaKind { .. } => ErrorKind::InvalidMediaKind,
            MediaError::NoFrameAvailable => ErrorKind::NoFrameAvailable,
            MediaError::DeviceUnavailable(_) | MediaError::Encode(_) => ErrorKind::DeviceUnavailable,
            MediaError::ReadFile { .. } => ErrorKind::Config,
        }
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::UpstreamRejected { .. } => ErrorKind::UpstreamRejected,
            GatewayError::UpstreamUnavailable { .. } | GatewayError::InvalidResponse { .. } => {
                ErrorKind::UpstreamUnavailable
            }
            GatewayError::InvalidRequest { .. } => ErrorKind::InvalidMediaKind,
            GatewayError::Client(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = std::result::Result<T, TryOnError>;
