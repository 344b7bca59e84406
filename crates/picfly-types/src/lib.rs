pub mod error;
pub mod geometry;
pub mod types;

pub use error::AppError;
pub use geometry::{Point, ScreenBounds, SelectionRect};
pub use types::{Combination, Command, Key, KeyAction, KeyEvent, OverlayEvent, ParseKeyError};
