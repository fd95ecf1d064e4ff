//! Default input substrate: `enigo` for pointer and keyboard, Win32 for focus.

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};

use crate::errors::{EfClawError, EfClawResult};
use crate::executor::input::{InputSubstrate, MouseButton, Press, WindowHandle};
use crate::executor::window;
use crate::perception::types::Point2D;

pub struct EnigoInput {
    enigo: Enigo,
}

impl EnigoInput {
    pub fn new() -> EfClawResult<Self> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| EfClawError::Executor(format!("input init: {e:?}")))?;
        Ok(Self { enigo })
    }
}

fn direction(press: Press) -> Direction {
    match press {
        Press::Down => Direction::Press,
        Press::Up => Direction::Release,
    }
}

fn to_enigo(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
    }
}

impl InputSubstrate for EnigoInput {
    fn is_foreground(&mut self, window: WindowHandle) -> EfClawResult<bool> {
        window::is_foreground(window)
    }

    fn move_window_to_foreground(&mut self, window: WindowHandle) -> EfClawResult<()> {
        window::bring_to_foreground(window)
    }

    fn emit_relative_motion(&mut self, dx: i32, dy: i32) -> EfClawResult<()> {
        self.enigo
            .move_mouse(dx, dy, Coordinate::Rel)
            .map_err(|e| EfClawError::Executor(format!("relative move ({dx}, {dy}): {e:?}")))
    }

    fn pointer_position(&mut self) -> EfClawResult<Point2D> {
        let (x, y) = self
            .enigo
            .location()
            .map_err(|e| EfClawError::Executor(format!("pointer location: {e:?}")))?;
        Ok(Point2D::new(x, y))
    }

    fn move_pointer_to(&mut self, position: Point2D) -> EfClawResult<()> {
        self.enigo
            .move_mouse(position.x, position.y, Coordinate::Abs)
            .map_err(|e| {
                EfClawError::Executor(format!("move to ({}, {}): {e:?}", position.x, position.y))
            })
    }

    fn mouse_button(&mut self, button: MouseButton, press: Press) -> EfClawResult<()> {
        self.enigo
            .button(to_enigo(button), direction(press))
            .map_err(|e| EfClawError::Executor(format!("{button:?} {press:?}: {e:?}")))
    }

    fn key(&mut self, key: char, press: Press) -> EfClawResult<()> {
        self.enigo
            .key(Key::Unicode(key), direction(press))
            .map_err(|e| EfClawError::Executor(format!("key {key:?} {press:?}: {e:?}")))
    }

    fn scroll(&mut self, position: Point2D, amount: i32) -> EfClawResult<()> {
        self.move_pointer_to(position)?;
        // enigo uses positive lengths for wheel-down
        self.enigo
            .scroll(-amount, Axis::Vertical)
            .map_err(|e| EfClawError::Executor(format!("scroll {amount}: {e:?}")))
    }
}
