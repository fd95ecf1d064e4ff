//! Smoothed relative pointer motion with a window-focus precondition.

use std::time::Duration;

use crate::errors::EfClawResult;
use crate::executor::control_law::ControlStep;
use crate::executor::input::{ClickOptions, InputSubstrate, KeyOptions, Press, WindowHandle};
use crate::perception::types::Point2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationSettings {
    /// Focus the game window first when it is not foregrounded.
    pub activate_window: bool,
    /// Only perform the focus step; emit no motion.
    pub activate_only: bool,
    /// Pause after focusing and after every sub-step.
    pub inter_step_delay: Duration,
    /// Number of equal sub-steps the motion is split into.
    pub step_count: u32,
}

impl Default for ActuationSettings {
    fn default() -> Self {
        Self {
            activate_window: true,
            activate_only: false,
            inter_step_delay: Duration::from_millis(20),
            step_count: 3,
        }
    }
}

impl ActuationSettings {
    pub fn with_delay(self, inter_step_delay: Duration) -> Self {
        Self {
            inter_step_delay,
            ..self
        }
    }
}

/// Moves the pointer by `step`, split into `step_count` rounded sub-steps.
///
/// Focus failures are logged and swallowed; the next perception cycle shows
/// whether the motion landed. Motion failures propagate.
pub async fn apply_step<S: InputSubstrate + ?Sized>(
    input: &mut S,
    window: WindowHandle,
    step: ControlStep,
    settings: &ActuationSettings,
) -> EfClawResult<()> {
    if settings.activate_window {
        ensure_foreground(input, window, settings.inter_step_delay).await;
    }
    if settings.activate_only {
        return Ok(());
    }

    let steps = settings.step_count.max(1);
    let sub_dx = (step.dx as f64 / steps as f64).round() as i32;
    let sub_dy = (step.dy as f64 / steps as f64).round() as i32;
    tracing::debug!(dx = step.dx, dy = step.dy, steps, sub_dx, sub_dy, "apply step");

    for _ in 0..steps {
        input.emit_relative_motion(sub_dx, sub_dy)?;
        tokio::time::sleep(settings.inter_step_delay).await;
    }
    Ok(())
}

/// Clicks at `position`, or where the pointer already is when `None`. The
/// button is held for `down_time` on the tokio clock; with `move_back` the
/// pointer returns to where it started.
pub async fn click<S: InputSubstrate + ?Sized>(
    input: &mut S,
    position: Option<Point2D>,
    options: ClickOptions,
) -> EfClawResult<()> {
    let restore = if options.move_back {
        Some(input.pointer_position()?)
    } else {
        None
    };
    if let Some(p) = position {
        input.move_pointer_to(p)?;
    }

    input.mouse_button(options.button, Press::Down)?;
    tokio::time::sleep(options.down_time).await;
    input.mouse_button(options.button, Press::Up)?;

    if let Some(p) = restore {
        input.move_pointer_to(p)?;
    }
    tracing::debug!(?position, button = ?options.button, "click");
    Ok(())
}

pub async fn press_key<S: InputSubstrate + ?Sized>(
    input: &mut S,
    key: char,
    options: KeyOptions,
) -> EfClawResult<()> {
    input.key(key, Press::Down)?;
    tokio::time::sleep(options.down_time).await;
    input.key(key, Press::Up)
}

async fn ensure_foreground<S: InputSubstrate + ?Sized>(
    input: &mut S,
    window: WindowHandle,
    delay: Duration,
) {
    match input.is_foreground(window) {
        Ok(true) => {}
        Ok(false) => match input.move_window_to_foreground(window) {
            Ok(()) => {
                tracing::debug!(window = window.0, "window activated");
                tokio::time::sleep(delay).await;
            }
            Err(e) => tracing::warn!(error = %e, window = window.0, "window activation failed"),
        },
        Err(e) => tracing::warn!(error = %e, window = window.0, "foreground query failed"),
    }
}
