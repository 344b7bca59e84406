//! Windows virtual-key codes to [`Key`].
//!
//! Kept free of any Win32 types so the table can be checked on every platform.

use picfly_types::Key;

pub fn key_from_vk(vk: u32) -> Key {
    match vk {
        0x08 => Key::Backspace,
        0x09 => Key::Tab,
        0x0D => Key::Enter,
        0x10 | 0xA0 | 0xA1 => Key::Shift,
        0x11 | 0xA2 | 0xA3 => Key::Control,
        0x12 | 0xA4 | 0xA5 => Key::Alt,
        0x1B => Key::Escape,
        0x20 => Key::Space,
        0x30..=0x39 => Key::Char(char::from(b'0' + (vk - 0x30) as u8)),
        0x41..=0x5A => Key::Char(char::from(b'a' + (vk - 0x41) as u8)),
        0x5B | 0x5C => Key::Meta,
        0x70..=0x87 => Key::Function((vk - 0x70 + 1) as u8),
        // OEM keys, US layout
        0xBA => Key::Char(';'),
        0xBB => Key::Char('='),
        0xBC => Key::Char(','),
        0xBD => Key::Char('-'),
        0xBE => Key::Char('.'),
        0xBF => Key::Char('/'),
        0xC0 => Key::Char('`'),
        0xDB => Key::Char('['),
        0xDC => Key::Char('\\'),
        0xDD => Key::Char(']'),
        0xDE => Key::Char('\''),
        other => Key::Other(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_keys() {
        assert_eq!(key_from_vk(0x77), Key::Function(8));
        assert_eq!(key_from_vk(0x39), Key::Char('9'));
        assert_eq!(key_from_vk(0x30), Key::Char('0'));
        assert_eq!(key_from_vk(0xBD), Key::Char('-'));
        assert_eq!(key_from_vk(0xBB), Key::Char('='));
        assert_eq!(key_from_vk(0x1B), Key::Escape);
    }

    #[test]
    fn ranges() {
        assert_eq!(key_from_vk(0x41), Key::Char('a'));
        assert_eq!(key_from_vk(0x5A), Key::Char('z'));
        assert_eq!(key_from_vk(0x70), Key::Function(1));
        assert_eq!(key_from_vk(0x87), Key::Function(24));
    }

    #[test]
    fn left_and_right_modifiers_collapse() {
        assert_eq!(key_from_vk(0xA2), key_from_vk(0xA3));
        assert_eq!(key_from_vk(0xA0), Key::Shift);
    }

    #[test]
    fn unknown_codes_round_trip_through_other() {
        assert_eq!(key_from_vk(0xAD), Key::Other(0xAD));
    }
}
