use std::collections::HashSet;
use std::time::Instant;

use picfly_types::{Combination, Command, Key, KeyAction, KeyEvent};

/// Turns a raw key stream into discrete commands.
///
/// A command fires only on the released -> pressed transition of a registered trigger
/// while that combination's base key is held. Key-repeat, key-ups and unrelated keys never
/// fire. The recognizer only observes; it never decides what happens to the key itself.
pub struct HotkeyRecognizer {
    combos: Vec<Combination>,
    pressed: HashSet<Key>,
    last_event_at: Option<Instant>,
}

impl HotkeyRecognizer {
    pub fn new(combos: impl IntoIterator<Item = Combination>) -> Self {
        Self {
            combos: combos.into_iter().collect(),
            pressed: HashSet::new(),
            last_event_at: None,
        }
    }

    /// Register another combination. Later registrations win over earlier ones
    /// sharing the same base and trigger.
    pub fn register(&mut self, combo: Combination) {
        self.combos.push(combo);
    }

    pub fn feed(&mut self, event: KeyEvent) -> Option<Command> {
        match self.last_event_at {
            Some(last) if event.at < last => {
                tracing::debug!(key = %event.key, "key event timestamp went backwards");
            }
            _ => self.last_event_at = Some(event.at),
        }

        match event.action {
            KeyAction::Up => {
                // Also covers ups we never saw go down
                self.pressed.remove(&event.key);
                None
            }
            KeyAction::Down => {
                if !self.pressed.insert(event.key) {
                    // OS key-repeat
                    return None;
                }
                self.combos
                    .iter()
                    .rev()
                    .find(|c| c.trigger == event.key && self.pressed.contains(&c.base))
                    .map(|c| c.command)
            }
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Forget every pressed key.
    pub fn reset(&mut self) {
        if !self.pressed.is_empty() {
            tracing::debug!(held = self.pressed.len(), "resetting key state");
        }
        self.pressed.clear();
    }
}
