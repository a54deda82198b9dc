//! Media acquisition error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while acquiring an image from a file or camera.
#[derive(Error, Debug)]
pub enum MediaError {
    /// The selected file does not declare an image content type.
    #[error("Please upload an image file (got '{content_type}')")]
    InvalidMediaKind { content_type: String },

    /// The camera has not produced a frame yet.
    #[error("No camera frame available yet")]
    NoFrameAvailable,

    /// Camera access was denied, revoked, or the device went away.
    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(#[from] DeviceError),

    /// Failed to transcode a camera frame into an upload payload.
    #[error("Failed to encode camera frame: {0}")]
    Encode(String),

    /// Failed to read a file from disk.
    #[error("Failed to read image file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a camera device cannot deliver frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device disconnected")]
    Disconnected,

    #[error("{0}")]
    Other(String),
}

/// Result type for media operations.
pub type Result<T> = std::result::Result<T, MediaError>;
