use picfly_config::notify::NotifyConfig;

/// Title limit of a desktop notification, in characters
pub const TITLE_LIMIT: usize = 20;
/// Body limit of a desktop notification, in characters
pub const MESSAGE_LIMIT: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            is_error: true,
        }
    }

    /// Same notification cut down to what a toast can show
    pub fn truncated(&self) -> Self {
        Self {
            title: truncate_chars(&self.title, TITLE_LIMIT).to_string(),
            message: truncate_chars(&self.message, MESSAGE_LIMIT).to_string(),
            is_error: self.is_error,
        }
    }
}

/// First `max` characters of `s`, never splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((cut, _)) => &s[..cut],
        None => s,
    }
}

/// Fire-and-forget user feedback.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log only
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, notification: Notification) {
        let Notification {
            title,
            message,
            is_error,
        } = notification;
        if is_error {
            tracing::warn!(%title, "{message}");
        } else {
            tracing::info!(%title, "{message}");
        }
    }
}

/// Toasts on Windows when enabled, the log everywhere else.
pub fn system_notifier(config: &NotifyConfig) -> Box<dyn NotificationSink> {
    if !config.enabled {
        return Box::new(LogNotifier);
    }

    #[cfg(windows)]
    {
        match crate::toast::ToastNotifier::spawn(config.app_id.clone()) {
            Ok(toast) => return Box::new(toast),
            Err(e) => tracing::warn!("toasts unavailable, notifications go to the log: {e}"),
        }
    }

    Box::new(LogNotifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("截图上传成功了吗", 4), "截图上传");
        assert_eq!(truncate_chars("", 4), "");
    }

    #[test]
    fn toast_limits() {
        let n = Notification::error("a very long title that keeps going", "x".repeat(100));
        let t = n.truncated();
        assert_eq!(t.title.chars().count(), TITLE_LIMIT);
        assert_eq!(t.message.len(), MESSAGE_LIMIT);
        assert!(t.is_error);
    }

    #[test]
    fn disabled_config_falls_back_to_log() {
        let config = NotifyConfig {
            enabled: false,
            ..Default::default()
        };
        // Must not panic or block
        system_notifier(&config).notify(Notification::info("picfly", "hi"));
    }
}
