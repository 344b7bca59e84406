use image::RgbaImage;
use picfly_types::ScreenBounds;
use xcap::Monitor;

use crate::CaptureError;
use crate::backdrop::{Backdrop, ScreenCapturer};

/// Snapshots every attached monitor through xcap.
pub struct XcapCapturer;

impl ScreenCapturer for XcapCapturer {
    fn capture_backdrop(&self) -> Result<Backdrop, CaptureError> {
        let monitors = Monitor::all()
            .map_err(|e| CaptureError::Backdrop(format!("failed to enumerate monitors: {e}")))?;

        let mut shots = Vec::with_capacity(monitors.len());
        for monitor in &monitors {
            let bounds = ScreenBounds {
                x: monitor.x(),
                y: monitor.y(),
                width: monitor.width(),
                height: monitor.height(),
            };
            let captured = monitor.capture_image().map_err(|e| {
                CaptureError::Backdrop(format!("failed to capture {}: {e}", monitor.name()))
            })?;

            let (width, height) = (captured.width(), captured.height());
            let image = RgbaImage::from_raw(width, height, captured.into_raw()).ok_or_else(|| {
                CaptureError::Backdrop(format!("monitor {} returned a short buffer", monitor.name()))
            })?;
            tracing::debug!(?bounds, width, height, "monitor captured");
            shots.push((bounds, image));
        }

        Backdrop::compose(shots)
    }
}
