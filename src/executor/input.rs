use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::EfClawResult;
use crate::perception::types::Point2D;

/// Native handle of the game window (an `HWND` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOptions {
    pub button: MouseButton,
    /// How long the button stays pressed.
    pub down_time: Duration,
    /// Return the pointer to where it was before the click.
    pub move_back: bool,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            down_time: Duration::from_millis(10),
            move_back: false,
        }
    }
}

impl ClickOptions {
    pub fn button(button: MouseButton) -> Self {
        Self {
            button,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOptions {
    pub down_time: Duration,
}

impl Default for KeyOptions {
    fn default() -> Self {
        Self {
            down_time: Duration::from_millis(20),
        }
    }
}

/// Whether a button or key goes down or comes back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    Down,
    Up,
}

/// Synthetic input and window focus.
///
/// Every call returns immediately; holding a button or key for some time is
/// the caller's job (see `executor::actuation::click` / `press_key`), so no
/// implementation blocks the async runtime. Calls must be safe to repeat:
/// focusing an already focused window or emitting a zero motion leaves the
/// window state untouched.
pub trait InputSubstrate {
    fn is_foreground(&mut self, window: WindowHandle) -> EfClawResult<bool>;

    fn move_window_to_foreground(&mut self, window: WindowHandle) -> EfClawResult<()>;

    fn emit_relative_motion(&mut self, dx: i32, dy: i32) -> EfClawResult<()>;

    fn pointer_position(&mut self) -> EfClawResult<Point2D>;

    fn move_pointer_to(&mut self, position: Point2D) -> EfClawResult<()>;

    fn mouse_button(&mut self, button: MouseButton, press: Press) -> EfClawResult<()>;

    fn key(&mut self, key: char, press: Press) -> EfClawResult<()>;

    /// Vertical wheel scroll at `position`; negative amounts turn the wheel down.
    fn scroll(&mut self, position: Point2D, amount: i32) -> EfClawResult<()>;
}
