//! Camera capture and frame normalization.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};

use super::error::{DeviceError, MediaError, Result};
use super::payload::ImagePayload;

/// File name given to camera captures, matching what a browser upload of a
/// screenshot would carry.
pub const CAMERA_FILE_NAME: &str = "camera-photo.jpg";

/// Content type of normalized camera captures.
pub const CAMERA_CONTENT_TYPE: &str = "image/jpeg";

/// A live camera the user granted access to.
///
/// `Ok(None)` means the device is open but has not produced a frame yet.
/// Errors mean access was denied or lost; callers may re-request the device.
pub trait CameraDevice {
    fn grab_frame(&mut self) -> std::result::Result<Option<RgbImage>, DeviceError>;

    fn name(&self) -> String {
        "camera".to_string()
    }
}

/// Reads one still frame and transcodes it into an upload payload.
pub fn capture_payload(device: &mut dyn CameraDevice) -> Result<ImagePayload> {
    let _span = tracing::info_span!("media.capture_frame").entered();

    let frame = device.grab_frame()?.ok_or(MediaError::NoFrameAvailable)?;
    if frame.width() == 0 || frame.height() == 0 {
        return Err(MediaError::NoFrameAvailable);
    }

    let bytes = encode_frame(&frame)?;
    log::debug!(
        "Captured {}x{} frame from {} ({} bytes)",
        frame.width(),
        frame.height(),
        device.name(),
        bytes.len()
    );

    Ok(ImagePayload::new(CAMERA_FILE_NAME, CAMERA_CONTENT_TYPE, bytes))
}

/// Encodes a raw RGB frame as JPEG.
pub fn encode_frame(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    frame
        .write_to(&mut out, ImageFormat::Jpeg)
        .map_err(|e| MediaError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

#[cfg(feature = "camera")]
pub use native::NativeCamera;

#[cfg(feature = "camera")]
mod native {
    use image::RgbImage;
    use nokhwa::{
        pixel_format::RgbFormat,
        utils::{CameraIndex, RequestedFormat, RequestedFormatType},
        Camera,
    };

    use super::CameraDevice;
    use crate::media::error::DeviceError;

    /// System camera opened through nokhwa.
    pub struct NativeCamera {
        camera: Camera,
    }

    impl NativeCamera {
        pub fn open(index: u32) -> Result<Self, DeviceError> {
            let requested = RequestedFormat::new::<RgbFormat>(
                RequestedFormatType::AbsoluteHighestResolution,
            );
            let mut camera = Camera::new(CameraIndex::Index(index), requested)
                .map_err(|e| DeviceError::Other(e.to_string()))?;
            camera
                .open_stream()
                .map_err(|e| DeviceError::Other(e.to_string()))?;
            log::info!("Opened camera: {}", camera.info().human_name());
            Ok(Self { camera })
        }
    }

    impl CameraDevice for NativeCamera {
        fn grab_frame(&mut self) -> Result<Option<RgbImage>, DeviceError> {
            if !self.camera.is_stream_open() {
                return Err(DeviceError::Disconnected);
            }
            let frame = self
                .camera
                .frame()
                .map_err(|e| DeviceError::Other(e.to_string()))?;
            let decoded = frame
                .decode_image::<RgbFormat>()
                .map_err(|e| DeviceError::Other(e.to_string()))?;
            let (width, height) = (decoded.width(), decoded.height());
            Ok(RgbImage::from_raw(width, height, decoded.into_raw()))
        }

        fn name(&self) -> String {
            self.camera.info().human_name()
        }
    }

    impl Drop for NativeCamera {
        fn drop(&mut self) {
            if let Err(e) = self.camera.stop_stream() {
                log::warn!("Failed to stop camera stream: {}", e);
            }
        }
    }
}
