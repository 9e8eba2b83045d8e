//! Screen capture of the primary display

use image::RgbaImage;
use thiserror::Error;
use xcap::Monitor;

use crate::match_engine::CaptureRegion;

/// The error type for screen capture operations.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to enumerate monitors: {source}")]
    MonitorEnumeration { source: xcap::XCapError },

    #[error("no monitors found")]
    NoMonitors,

    #[error("failed to query monitor geometry: {source}")]
    MonitorGeometry { source: xcap::XCapError },

    #[error("screen capture failed: {source}")]
    Frame { source: xcap::XCapError },

    #[error("captured frame could not be converted to an RGBA buffer")]
    BufferConversion,

    #[error("capture region {region:?} is empty after clipping to the {width}x{height} display")]
    EmptyRegion {
        region: CaptureRegion,
        width: u32,
        height: u32,
    },
}

/// Source of screen pixels for the match engine.
///
/// The engine only ever consumes this trait, so tests can substitute
/// synthetic frames without a display server.
pub trait ScreenSource {
    /// Full display size in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Capture the given region as an RGBA buffer. The region is expected to
    /// be pre-clipped to the display bounds.
    fn capture(&mut self, region: CaptureRegion) -> Result<RgbaImage, CaptureError>;
}

/// Captures from the primary monitor via `xcap`.
pub struct PrimaryScreen {
    monitor: Monitor,
    width: u32,
    height: u32,
}

impl PrimaryScreen {
    /// Open the primary monitor, falling back to the first one reported.
    pub fn open() -> Result<Self, CaptureError> {
        let monitors =
            Monitor::all().map_err(|source| CaptureError::MonitorEnumeration { source })?;

        let monitor = monitors
            .into_iter()
            .reduce(|primary, candidate| {
                if candidate.is_primary().unwrap_or(false) {
                    candidate
                } else {
                    primary
                }
            })
            .ok_or(CaptureError::NoMonitors)?;

        let width = monitor
            .width()
            .map_err(|source| CaptureError::MonitorGeometry { source })?;
        let height = monitor
            .height()
            .map_err(|source| CaptureError::MonitorGeometry { source })?;

        Ok(Self {
            monitor,
            width,
            height,
        })
    }
}

impl ScreenSource for PrimaryScreen {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn capture(&mut self, region: CaptureRegion) -> Result<RgbaImage, CaptureError> {
        let frame = self
            .monitor
            .capture_image()
            .map_err(|source| CaptureError::Frame { source })?;

        // Rebuild through raw bytes so the buffer is our `image` crate's
        // type regardless of the version xcap was compiled against.
        let (fw, fh) = (frame.width(), frame.height());
        let full = RgbaImage::from_raw(fw, fh, frame.into_raw())
            .ok_or(CaptureError::BufferConversion)?;

        let clipped = region.clip_to_screen(fw, fh);
        if !clipped.is_valid() {
            return Err(CaptureError::EmptyRegion {
                region,
                width: fw,
                height: fh,
            });
        }

        if clipped == CaptureRegion::full_screen(fw, fh) {
            return Ok(full);
        }

        Ok(image::imageops::crop_imm(
            &full,
            clipped.x1,
            clipped.y1,
            clipped.width(),
            clipped.height(),
        )
        .to_image())
    }
}
