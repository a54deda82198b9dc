//! Backend gateway error types.

use thiserror::Error;

/// Backend operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    PreprocessGarment,
    PreprocessPerson,
    Synthesize,
    FetchResult,
    Health,
    Cleanup,
}

impl GatewayOperation {
    /// Message shown when the service gives no detail of its own.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            GatewayOperation::PreprocessGarment => "Failed to process cloth image",
            GatewayOperation::PreprocessPerson => "Failed to process person image",
            GatewayOperation::Synthesize => "Failed to generate try-on result",
            GatewayOperation::FetchResult => "Failed to download try-on result",
            GatewayOperation::Health => "Health check failed",
            GatewayOperation::Cleanup => "Cleanup failed",
        }
    }
}

impl std::fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayOperation::PreprocessGarment => write!(f, "preprocess garment"),
            GatewayOperation::PreprocessPerson => write!(f, "preprocess person"),
            GatewayOperation::Synthesize => write!(f, "synthesize"),
            GatewayOperation::FetchResult => write!(f, "fetch result"),
            GatewayOperation::Health => write!(f, "health"),
            GatewayOperation::Cleanup => write!(f, "cleanup"),
        }
    }
}

/// Errors returned by the try-on service boundary.
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// The service refused the request (HTTP 4xx).
    #[error("{detail}")]
    UpstreamRejected {
        operation: GatewayOperation,
        status: u16,
        detail: String,
    },

    /// The service could not be reached or failed (network error, HTTP 5xx).
    #[error("{detail}")]
    UpstreamUnavailable {
        operation: GatewayOperation,
        status: Option<u16>,
        detail: String,
    },

    /// The service answered successfully but the body was unusable.
    #[error("Invalid response from {operation}: {detail}")]
    InvalidResponse {
        operation: GatewayOperation,
        detail: String,
    },

    /// The request could not be built locally; nothing was sent.
    #[error("Invalid request for {operation}: {detail}")]
    InvalidRequest {
        operation: GatewayOperation,
        detail: String,
    },

    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

impl GatewayError {
    pub fn operation(&self) -> Option<GatewayOperation> {
        match self {
            GatewayError::UpstreamRejected { operation, .. }
            | GatewayError::UpstreamUnavailable { operation, .. }
            | GatewayError::InvalidResponse { operation, .. }
            | GatewayError::InvalidRequest { operation, .. } => Some(*operation),
            GatewayError::Client(_) => None,
        }
    }

    /// HTTP status reported by the service, if there was a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::UpstreamRejected { status, .. } => Some(*status),
            GatewayError::UpstreamUnavailable { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
