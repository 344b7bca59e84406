mod clipboard;
mod notify;

#[cfg(windows)]
mod com;
#[cfg(windows)]
mod toast;

pub use clipboard::{ClipboardAccess, ClipboardContent, SystemClipboard, classify};
pub use notify::{LogNotifier, Notification, NotificationSink, system_notifier, truncate_chars};

#[cfg(windows)]
pub use toast::ToastNotifier;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),

    #[error("notification failed: {0}")]
    Notify(String),

    #[error("failed to start notifier thread: {0}")]
    Spawn(#[from] std::io::Error),
}
