//! Proportional step law for camera steering.
//!
//! The step grows with distance (`scale`), is held inside `[min_step, max_step]`
//! so small offsets still make progress, and is finally capped by `base_step`.
//! Each axis is rounded on its own, so the realized magnitude can differ from
//! the clamped one by up to half a pixel per axis.

use serde::{Deserialize, Serialize};

use crate::errors::{EfClawError, EfClawResult};
use crate::perception::types::Point2D;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepBounds {
    #[serde(default = "default_base_step")]
    pub base_step: u32,
    #[serde(default = "default_min_step")]
    pub min_step: u32,
    #[serde(default = "default_max_step")]
    pub max_step: u32,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_base_step() -> u32 {
    90
}

fn default_min_step() -> u32 {
    60
}

fn default_max_step() -> u32 {
    150
}

fn default_scale() -> f64 {
    0.15
}

impl Default for StepBounds {
    fn default() -> Self {
        Self {
            base_step: default_base_step(),
            min_step: default_min_step(),
            max_step: default_max_step(),
            scale: default_scale(),
        }
    }
}

impl StepBounds {
    pub fn with_base_step(self, base_step: u32) -> Self {
        Self { base_step, ..self }
    }

    /// Largest magnitude the law may request.
    pub fn ceiling(&self) -> u32 {
        self.base_step.min(self.max_step)
    }

    pub fn validate(&self) -> EfClawResult<()> {
        if self.min_step == 0 || self.min_step > self.max_step {
            return Err(EfClawError::Config(format!(
                "step bounds need 0 < min_step <= max_step (got {} / {})",
                self.min_step, self.max_step
            )));
        }
        if self.base_step == 0 {
            return Err(EfClawError::Config("base_step must be positive".into()));
        }
        if !(self.scale > 0.0) {
            return Err(EfClawError::Config(format!(
                "step scale must be positive (got {})",
                self.scale
            )));
        }
        Ok(())
    }
}

/// Relative pointer delta for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlStep {
    pub dx: i32,
    pub dy: i32,
}

impl ControlStep {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    pub fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    pub fn magnitude(&self) -> f64 {
        (self.dx as f64).hypot(self.dy as f64)
    }
}

pub fn compute_step(from: Point2D, to: Point2D, bounds: &StepBounds) -> ControlStep {
    let dx_raw = (to.x - from.x) as f64;
    let dy_raw = (to.y - from.y) as f64;
    let dist = dx_raw.hypot(dy_raw);
    if dist == 0.0 {
        return ControlStep::ZERO;
    }

    let raw = (dist * bounds.scale).floor() as u32;
    let step = raw.clamp(bounds.min_step, bounds.max_step).min(bounds.base_step) as f64;

    ControlStep::new(
        (dx_raw / dist * step).round() as i32,
        (dy_raw / dist * step).round() as i32,
    )
}
