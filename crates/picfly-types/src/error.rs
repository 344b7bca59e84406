/// Application-level failure kinds.
///
/// Only [`AppError::InputSourceUnavailable`] is fatal; every other kind is reported to the
/// user and the background listener keeps running.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("hotkey listener could not start: {0}")]
    InputSourceUnavailable(String),

    #[error("screen capture failed: {0}")]
    DisplayCaptureFailed(String),

    #[error("clipboard has no image or image link")]
    ClipboardEmptyOrUnsupported,

    #[error("request failed: {0}")]
    NetworkCallFailed(String),
}
