use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SelectorConfig {
    /// Drags narrower or shorter than this many pixels count as a stray click
    pub min_extent: u32,
    /// How strongly the backdrop outside the selection is darkened, 0..=255
    pub dim_alpha: u8,
    /// Upper bound on how long the overlay loop waits for input before checking for cancellation
    pub poll_interval_ms: u64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_extent: 2,
            dim_alpha: 77,
            poll_interval_ms: 15,
        }
    }
}
