//! Image acquisition from files and cameras.
//!
//! Both sources produce a [`MediaSelection`]: a normalized [`ImagePayload`]
//! plus a [`PreviewHandle`] that is released when the selection is dropped.

pub mod camera;
pub mod error;
pub mod payload;
pub mod preview;

pub use camera::{capture_payload, encode_frame, CameraDevice};
#[cfg(feature = "camera")]
pub use camera::NativeCamera;
pub use error::{DeviceError, MediaError};
pub use payload::{FileInput, ImagePayload};
pub use preview::{PreviewHandle, PreviewRegistry};

/// Where an image comes from.
pub enum MediaSource<'a> {
    File(FileInput),
    Camera(&'a mut dyn CameraDevice),
}

impl MediaSource<'_> {
    /// Acquires the image and allocates its preview.
    pub fn acquire(self, previews: &PreviewRegistry) -> error::Result<MediaSelection> {
        match self {
            MediaSource::File(input) => select_file(input, previews),
            MediaSource::Camera(device) => capture_frame(device, previews),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MediaSource::File(_) => "file",
            MediaSource::Camera(_) => "camera",
        }
    }
}

impl std::fmt::Debug for MediaSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaSource::File(input) => f.debug_tuple("File").field(&input.name).finish(),
            MediaSource::Camera(device) => f.debug_tuple("Camera").field(&device.name()).finish(),
        }
    }
}

/// An acquired image and its preview.
#[derive(Debug)]
pub struct MediaSelection {
    pub payload: ImagePayload,
    pub preview: PreviewHandle,
}

/// Accepts a picked file if it declares (or looks like) an image.
pub fn select_file(input: FileInput, previews: &PreviewRegistry) -> error::Result<MediaSelection> {
    let content_type = input.content_kind().unwrap_or_default().to_ascii_lowercase();
    if !content_type.starts_with("image/") {
        log::warn!(
            "Rejected file '{}' with content type '{}'",
            input.name,
            content_type
        );
        return Err(MediaError::InvalidMediaKind { content_type });
    }

    let payload = ImagePayload::new(input.name, content_type, input.bytes);
    let preview = previews.allocate(payload.shared_bytes());
    log::debug!("Selected file '{}' ({} bytes)", payload.file_name(), payload.len());
    Ok(MediaSelection { payload, preview })
}

/// Captures one camera frame and normalizes it to a JPEG upload payload.
pub fn capture_frame(
    device: &mut dyn CameraDevice,
    previews: &PreviewRegistry,
) -> error::Result<MediaSelection> {
    let payload = capture_payload(device)?;
    let preview = previews.allocate(payload.shared_bytes());
    Ok(MediaSelection { payload, preview })
}
