mod backdrop;
mod overlay;
mod selector;
mod session;

#[cfg(windows)]
mod capture;
#[cfg(windows)]
mod dpi;
#[cfg(windows)]
mod win_overlay;

pub use backdrop::{Backdrop, CapturedRegion, ScreenCapturer, encode_png};
pub use overlay::{
    BORDER_LAYERS, DAMAGE_MARGIN, OverlayFrames, OverlaySession, OverlaySurface, Patch, Rgb,
};
pub use selector::RegionSelector;
pub use session::{SelectionOutcome, SelectionSession, SessionState, Step};

#[cfg(windows)]
pub use capture::XcapCapturer;
#[cfg(windows)]
pub use dpi::enable_dpi_awareness;
#[cfg(windows)]
pub use win_overlay::WinOverlay;

use picfly_types::AppError;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to capture the screen: {0}")]
    Backdrop(String),

    #[error("overlay failed: {0}")]
    Overlay(String),

    #[error("a selection is already in progress")]
    Busy,

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

impl From<CaptureError> for AppError {
    fn from(e: CaptureError) -> Self {
        AppError::DisplayCaptureFailed(e.to_string())
    }
}
