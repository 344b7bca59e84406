use picfly_types::{Command, Key};
use serde::{Deserialize, Serialize};

use self::hotkeys::HotkeyConfig;
use self::notify::NotifyConfig;
use self::ocr::OcrConfig;
use self::selector::SelectorConfig;
use self::upload::UploadConfig;

pub mod hotkeys;
pub mod notify;
pub mod ocr;
pub mod selector;
pub mod upload;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{base}+{trigger} is bound to both {first} and {second}")]
    DuplicateBinding {
        base: Key,
        trigger: Key,
        first: Command,
        second: Command,
    },

    #[error("trigger for {command} is the base key {key}")]
    TriggerIsBase { key: Key, command: Command },

    #[error("command_queue_capacity must be at least 1")]
    EmptyQueue,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub hotkeys: HotkeyConfig,
    pub selector: SelectorConfig,
    pub upload: UploadConfig,
    pub ocr: OcrConfig,
    pub notify: NotifyConfig,

    /// Capacity of the hotkey listener -> dispatcher command queue
    pub command_queue_capacity: usize,
}

impl Config {
    /// Apply environment overrides on top of a loaded profile.
    ///
    /// Endpoints and tokens come from the environment whenever it sets them, so they never
    /// have to live in a profile file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.upload.apply_env(&lookup);
        self.ocr.apply_env(&lookup);
        if let Some(capacity) = lookup("PICFLY_QUEUE_CAPACITY").and_then(|v| v.parse().ok()) {
            self.command_queue_capacity = capacity;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_queue_capacity == 0 {
            return Err(ConfigError::EmptyQueue);
        }
        self.hotkeys.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hotkeys: HotkeyConfig::default(),
            selector: SelectorConfig::default(),
            upload: UploadConfig::default(),
            ocr: OcrConfig::default(),
            notify: NotifyConfig::default(),

            command_queue_capacity: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_profile_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "upload": { "endpoint": "https://img.example/api/upload", "link_pointer": "/data/url" },
                "selector": { "min_extent": 4 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.upload.endpoint, "https://img.example/api/upload");
        assert_eq!(config.upload.link_pointer, "/data/url");
        assert_eq!(config.upload.file_field, "file");
        assert_eq!(config.selector.min_extent, 4);
        assert_eq!(config.selector.dim_alpha, 77);
        assert_eq!(config.hotkeys.base, Key::Function(8));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_queue_is_rejected() {
        let config = Config {
            command_queue_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyQueue)));
    }

    #[test]
    fn env_overrides_profile_secrets_only_when_set() {
        let mut config: Config = serde_json::from_str(
            r#"{ "upload": { "endpoint": "https://profile.example/up", "token": "from-profile" } }"#,
        )
        .unwrap();

        config.apply_env(|key| match key {
            "PICFLY_UPLOAD_TOKEN" => Some("from-env".into()),
            "PICFLY_UPLOAD_ENDPOINT" => Some("  ".into()),
            "PICFLY_OCR_ENDPOINT" => Some("https://ocr.example".into()),
            _ => None,
        });

        assert_eq!(config.upload.token, "from-env");
        assert_eq!(config.upload.endpoint, "https://profile.example/up");
        assert_eq!(config.ocr.endpoint, "https://ocr.example");
        assert!(config.ocr.token.is_empty());
        assert_eq!(config.command_queue_capacity, 16);
    }

    #[test]
    fn defaults_carry_no_secrets() {
        let config = Config::default();
        assert!(config.upload.token.is_empty());
        assert!(config.upload.endpoint.is_empty());
        assert!(config.ocr.token.is_empty());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hotkeys.quit, Key::Escape);
        assert_eq!(back.notify.title, "picfly");
    }
}
