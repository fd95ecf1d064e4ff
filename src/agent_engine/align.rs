use std::fmt;

use rand::Rng;
use regex::Regex;

use crate::agent_engine::session::AgentSession;
use crate::errors::{EfClawError, EfClawResult};
use crate::executor::actuation::apply_step;
use crate::executor::control_law::{compute_step, ControlStep};
use crate::executor::input::InputSubstrate;
use crate::perception::traits::Perception;
use crate::perception::types::{DetectedRegion, Point2D};

/// What the alignment loop asks perception to find.
#[derive(Debug, Clone)]
pub enum TargetSelector {
    Text(Regex),
    Feature(String),
}

impl TargetSelector {
    /// Text selector matching `literal` verbatim.
    pub fn literal(literal: &str) -> EfClawResult<Self> {
        Ok(Self::Text(Regex::new(&regex::escape(literal))?))
    }
}

impl fmt::Display for TargetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(pattern) => write!(f, "text /{}/", pattern.as_str()),
            Self::Feature(id) => write!(f, "feature '{id}'"),
        }
    }
}

impl<P: Perception, S: InputSubstrate> AgentSession<P, S> {
    /// Steers the view until the selected target sits within tolerance of the
    /// screen center.
    ///
    /// A miss re-steers toward the last fix when there is one and nudges the
    /// pointer randomly otherwise. Running out of iterations is
    /// `AlignmentFailed`.
    pub async fn align_to_center(
        &mut self,
        selector: &TargetSelector,
        max_iterations: u32,
    ) -> EfClawResult<()> {
        let tolerance = self.config.servo.tolerance_px;

        for iteration in 1..=max_iterations {
            let frame = self.perception.capture().await?;
            let center = frame.center();

            match self.perceive(selector).await? {
                Some(mut target) => {
                    target.y -= self.config.servo.capture_offset(frame.height);
                    let found = target.center();
                    let (dx, dy) = (found.x - center.x, found.y - center.y);
                    self.last_target = Some(target.clone());

                    if dx.abs() <= tolerance && dy.abs() <= tolerance {
                        tracing::info!(%selector, iteration, dx, dy, "target centered");
                        return Ok(());
                    }
                    tracing::debug!(%selector, iteration, dx, dy, "steering toward target");
                    self.steer_towards(center, found).await?;
                }
                None => match self.last_target.as_ref().map(DetectedRegion::center) {
                    Some(stale) => {
                        tracing::debug!(
                            %selector,
                            iteration,
                            x = stale.x,
                            y = stale.y,
                            "target lost, steering toward last fix"
                        );
                        self.steer_towards(center, stale).await?;
                    }
                    None => {
                        tracing::debug!(%selector, iteration, "target not found, nudging");
                        self.nudge().await?;
                    }
                },
            }
        }

        tracing::warn!(%selector, max_iterations, "alignment failed");
        Err(EfClawError::AlignmentFailed {
            target: selector.to_string(),
            iterations: max_iterations,
        })
    }

    async fn perceive(&self, selector: &TargetSelector) -> EfClawResult<Option<DetectedRegion>> {
        let hits = match selector {
            TargetSelector::Text(pattern) => {
                self.perception
                    .recognize_text(None, Some(pattern), self.config.servo.recognize_timeout())
                    .await?
            }
            TargetSelector::Feature(id) => self.perception.recognize_feature(None, id).await?,
        };
        Ok(hits.into_iter().next())
    }

    async fn steer_towards(&mut self, from: Point2D, to: Point2D) -> EfClawResult<()> {
        let servo = &self.config.servo;
        let bounds = servo.step.with_base_step(servo.steer_base_step);
        let step = compute_step(from, to, &bounds);
        if step.is_zero() {
            return Ok(());
        }
        let settings = self.config.actuation.settings();
        apply_step(&mut self.input, self.window, step, &settings).await
    }

    async fn nudge(&mut self) -> EfClawResult<()> {
        let max = self.config.servo.nudge_max_offset.abs();
        let step = ControlStep::new(
            self.rng.gen_range(-max..=max),
            self.rng.gen_range(-max..=max),
        );
        let settings = self
            .config
            .actuation
            .settings()
            .with_delay(self.config.servo.nudge_delay());
        apply_step(&mut self.input, self.window, step, &settings).await
    }
}
