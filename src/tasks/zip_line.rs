//! Zip-line route runner: center each leg's distance label, attach, ride
//! until the idle prompt returns, detach.

use std::time::Duration;

use regex::Regex;
use tokio::time::sleep;

use crate::agent_engine::align::TargetSelector;
use crate::agent_engine::loop_control::Deadline;
use crate::agent_engine::session::AgentSession;
use crate::errors::{EfClawError, EfClawResult};
use crate::executor::actuation::{click, press_key};
use crate::executor::input::{ClickOptions, InputSubstrate, KeyOptions, MouseButton};
use crate::perception::traits::Perception;
use crate::perception::types::ScreenRect;

const ATTACH_SETTLE: Duration = Duration::from_millis(500);

/// `"108,64,109"` -> `[108, 64, 109]`.
pub fn parse_route(route: &str) -> EfClawResult<Vec<u32>> {
    let legs = route
        .split(',')
        .map(|leg| {
            let leg = leg.trim();
            leg.parse::<u32>().map_err(|e| {
                EfClawError::Config(format!("bad zip-line leg '{leg}' in '{route}': {e}"))
            })
        })
        .collect::<EfClawResult<Vec<_>>>()?;
    if legs.is_empty() {
        return Err(EfClawError::Config("zip-line route has no legs".into()));
    }
    Ok(legs)
}

/// Selector for a leg's distance label. Labels carry a unit and sometimes a
/// caption ("108m", "找108m的滑索"); the digits must not run on, so 108 never
/// matches "1080m".
pub fn leg_selector(distance: u32) -> EfClawResult<TargetSelector> {
    let pattern = Regex::new(&format!(r"(?:^|\D){distance}(?:\D|$)"))?;
    Ok(TargetSelector::Text(pattern))
}

impl<P: Perception, S: InputSubstrate> AgentSession<P, S> {
    /// Rides every leg of the configured route; returns the legs ridden.
    pub async fn run_zip_line_route(&mut self) -> EfClawResult<Vec<u32>> {
        let legs = self.config.zip_line.selected_legs()?;
        tracing::info!(
            route = %self.config.zip_line.selected_route,
            ?legs,
            "zip-line route start"
        );

        self.wait_for_mount().await?;
        for (index, &distance) in legs.iter().enumerate() {
            self.ride_leg(distance).await?;
            tracing::info!(leg = index + 1, distance, "zip-line leg done");
        }
        Ok(legs)
    }

    /// Polls until the idle prompt says the player is on a zip line.
    pub async fn wait_for_mount(&mut self) -> EfClawResult<()> {
        let zip = &self.config.zip_line;
        let deadline = Deadline::new(Duration::from_secs(zip.mount_timeout_secs));
        let poll = Duration::from_millis(zip.mount_poll_ms);

        while !self.arrival_visible().await? {
            tracing::info!("waiting to be mounted on a zip line");
            deadline.check("zip-line mount")?;
            sleep(poll).await;
        }
        Ok(())
    }

    /// Aligns to the `distance` label, attaches, and rides to the next stop.
    pub async fn ride_leg(&mut self, distance: u32) -> EfClawResult<()> {
        // the previous leg's label is no hint for this one
        self.clear_last_target();
        let selector = leg_selector(distance)?;
        self.align_to_center(&selector, self.config.servo.max_iterations)
            .await?;

        click(&mut self.input, None, ClickOptions::default()).await?;
        sleep(ATTACH_SETTLE).await;

        let zip = &self.config.zip_line;
        let deadline = Deadline::new(Duration::from_secs(zip.leg_timeout_secs));
        let interval = Duration::from_millis(zip.ride_key_interval_ms);
        let ride_key = zip.ride_key;

        while !self.arrival_visible().await? {
            press_key(&mut self.input, ride_key, KeyOptions::default()).await?;
            deadline.check(&format!("zip-line leg {distance}"))?;
            sleep(interval).await;
        }

        click(&mut self.input, None, ClickOptions::button(MouseButton::Right)).await?;
        Ok(())
    }

    async fn arrival_visible(&self) -> EfClawResult<bool> {
        let frame = self.perception.capture().await?;
        let band = ScreenRect::from_relative(frame, 0.0, 0.5, 1.0, 1.0);
        let pattern = Regex::new(&regex::escape(&self.config.zip_line.arrival_text))?;
        let hits = self
            .perception
            .recognize_text(Some(band), Some(&pattern), Duration::ZERO)
            .await?;
        Ok(!hits.is_empty())
    }
}
