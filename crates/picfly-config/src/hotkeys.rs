use picfly_types::{Combination, Command, Key};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Hotkey table: one shared base key plus a trigger per command.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct HotkeyConfig {
    pub base: Key,
    pub capture_upload: Key,
    pub clipboard_upload: Key,
    pub capture_ocr: Key,
    pub clipboard_ocr: Key,
    pub quit: Key,
    /// Swallow the trigger key-down that fired a command instead of passing it on
    pub suppress_triggers: bool,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            base: Key::Function(8),
            capture_upload: Key::Char('9'),
            clipboard_upload: Key::Char('0'),
            capture_ocr: Key::Char('-'),
            clipboard_ocr: Key::Char('='),
            quit: Key::Escape,
            suppress_triggers: false,
        }
    }
}

impl HotkeyConfig {
    pub fn trigger_for(&self, command: Command) -> Key {
        match command {
            Command::CaptureUpload => self.capture_upload,
            Command::ClipboardUpload => self.clipboard_upload,
            Command::CaptureOcr => self.capture_ocr,
            Command::ClipboardOcr => self.clipboard_ocr,
            Command::Quit => self.quit,
        }
    }

    /// Registered combinations, in registration order
    pub fn combinations(&self) -> Vec<Combination> {
        Command::ALL
            .into_iter()
            .map(|command| Combination::new(self.base, self.trigger_for(command), command))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let combos = self.combinations();
        for (i, combo) in combos.iter().enumerate() {
            if combo.trigger == combo.base {
                return Err(ConfigError::TriggerIsBase {
                    key: combo.base,
                    command: combo.command,
                });
            }
            if let Some(other) = combos[..i]
                .iter()
                .find(|c| c.base == combo.base && c.trigger == combo.trigger)
            {
                return Err(ConfigError::DuplicateBinding {
                    base: combo.base,
                    trigger: combo.trigger,
                    first: other.command,
                    second: combo.command,
                });
            }
        }
        Ok(())
    }
}
