use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Application command produced by a recognized hotkey combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    CaptureUpload,
    ClipboardUpload,
    CaptureOcr,
    ClipboardOcr,
    Quit,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::CaptureUpload,
        Command::ClipboardUpload,
        Command::CaptureOcr,
        Command::ClipboardOcr,
        Command::Quit,
    ];

    /// Commands that open the region selector before doing anything else
    pub fn needs_selection(self) -> bool {
        matches!(self, Command::CaptureUpload | Command::CaptureOcr)
    }

    pub fn label(self) -> &'static str {
        match self {
            Command::CaptureUpload => "capture & upload",
            Command::ClipboardUpload => "clipboard upload",
            Command::CaptureOcr => "capture & OCR",
            Command::ClipboardOcr => "clipboard OCR",
            Command::Quit => "quit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Physical key identifier.
///
/// Printable keys are stored as their unshifted character (`Char('9')`, `Char('-')`),
/// letters lowercased. Keys without a name round-trip through `Other` with the raw
/// platform key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Function(u8),
    Char(char),
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    Shift,
    Control,
    Alt,
    Meta,
    Other(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key name: {0:?}")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        let named = match lower.as_str() {
            "esc" | "escape" => Some(Key::Escape),
            "enter" | "return" => Some(Key::Enter),
            "space" => Some(Key::Space),
            "tab" => Some(Key::Tab),
            "backspace" => Some(Key::Backspace),
            "shift" => Some(Key::Shift),
            "ctrl" | "control" => Some(Key::Control),
            "alt" => Some(Key::Alt),
            "win" | "meta" | "super" => Some(Key::Meta),
            "minus" => Some(Key::Char('-')),
            "equal" | "equals" => Some(Key::Char('=')),
            _ => None,
        };
        if let Some(key) = named {
            return Ok(key);
        }

        let mut chars = lower.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && c.is_ascii_graphic()
        {
            return Ok(Key::Char(c));
        }

        if let Some(n) = lower.strip_prefix('f')
            && let Ok(n) = n.parse::<u8>()
            && (1..=24).contains(&n)
        {
            return Ok(Key::Function(n));
        }

        if let Some(code) = lower.strip_prefix("vk")
            && let Ok(code) = code.parse::<u32>()
        {
            return Ok(Key::Other(code));
        }

        Err(ParseKeyError(trimmed.to_string()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Function(n) => write!(f, "F{n}"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Escape => f.write_str("Esc"),
            Key::Enter => f.write_str("Enter"),
            Key::Space => f.write_str("Space"),
            Key::Tab => f.write_str("Tab"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Shift => f.write_str("Shift"),
            Key::Control => f.write_str("Ctrl"),
            Key::Alt => f.write_str("Alt"),
            Key::Meta => f.write_str("Win"),
            Key::Other(code) => write!(f, "vk{code}"),
        }
    }
}

impl TryFrom<String> for Key {
    type Error = ParseKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// One hotkey binding: `trigger` pressed while `base` is held produces `command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Combination {
    pub base: Key,
    pub trigger: Key,
    pub command: Command,
}

impl Combination {
    pub const fn new(base: Key, trigger: Key, command: Command) -> Self {
        Self {
            base,
            trigger,
            command,
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{} -> {}", self.base, self.trigger, self.command)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

/// Raw keyboard event as delivered by the input source
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
    pub at: Instant,
}

impl KeyEvent {
    pub fn down(key: Key, at: Instant) -> Self {
        Self {
            key,
            action: KeyAction::Down,
            at,
        }
    }

    pub fn up(key: Key, at: Instant) -> Self {
        Self {
            key,
            action: KeyAction::Up,
            at,
        }
    }
}

/// Input delivered to a running selector session, in overlay-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    /// Escape or the secondary button
    Cancel,
    /// The overlay window went away underneath the session
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_table_names() {
        assert_eq!("F8".parse::<Key>().unwrap(), Key::Function(8));
        assert_eq!("9".parse::<Key>().unwrap(), Key::Char('9'));
        assert_eq!("-".parse::<Key>().unwrap(), Key::Char('-'));
        assert_eq!("=".parse::<Key>().unwrap(), Key::Char('='));
        assert_eq!("Esc".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!("escape".parse::<Key>().unwrap(), Key::Escape);
    }

    #[test]
    fn letters_are_lowercased() {
        assert_eq!("Q".parse::<Key>().unwrap(), Key::Char('q'));
    }

    #[test]
    fn rejects_unknown_names() {
        assert!("F25".parse::<Key>().is_err());
        assert!("hyper".parse::<Key>().is_err());
        assert!("".parse::<Key>().is_err());
    }

    #[test]
    fn display_parses_back() {
        for key in [
            Key::Function(12),
            Key::Char('='),
            Key::Escape,
            Key::Control,
            Key::Other(233),
        ] {
            assert_eq!(key.to_string().parse::<Key>().unwrap(), key);
        }
    }

    #[test]
    fn key_serializes_as_name() {
        let json = serde_json::to_string(&Key::Function(8)).unwrap();
        assert_eq!(json, "\"F8\"");
        let key: Key = serde_json::from_str("\"esc\"").unwrap();
        assert_eq!(key, Key::Escape);
    }

    #[test]
    fn combination_reads_like_the_banner() {
        let combo = Combination::new(Key::Function(8), Key::Char('-'), Command::CaptureOcr);
        assert_eq!(combo.to_string(), "F8+- -> capture & OCR");
        let quit = Combination::new(Key::Function(8), Key::Escape, Command::Quit);
        assert_eq!(quit.to_string(), "F8+Esc -> quit");
    }

    #[test]
    fn only_capture_commands_need_selection() {
        let selecting: Vec<_> = Command::ALL
            .into_iter()
            .filter(|c| c.needs_selection())
            .collect();
        assert_eq!(selecting, vec![Command::CaptureUpload, Command::CaptureOcr]);
    }
}
