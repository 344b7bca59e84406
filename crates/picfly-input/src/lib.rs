mod listener;
mod recognizer;
mod vk;

#[cfg(windows)]
mod hook;

pub use listener::{
    Disposition, EventSink, HotkeyListener, InputEventSource, KeyStateReset, Stopper,
};
pub use recognizer::HotkeyRecognizer;
pub use vk::key_from_vk;

#[cfg(windows)]
pub use hook::{HookStopper, KeyboardHook};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("keyboard hook unavailable: {0}")]
    Unavailable(String),

    #[error("failed to start listener thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<InputError> for picfly_types::AppError {
    fn from(e: InputError) -> Self {
        picfly_types::AppError::InputSourceUnavailable(e.to_string())
    }
}
