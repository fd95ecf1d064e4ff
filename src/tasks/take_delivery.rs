//! Delivery board: take the first ticket matching the enabled categories,
//! refreshing the listing until one shows up.

use std::time::Duration;

use regex::Regex;
use tokio::time::{sleep, Instant};

use crate::agent_engine::session::AgentSession;
use crate::config::DeliveryBoardConfig;
use crate::errors::{EfClawError, EfClawResult};
use crate::executor::actuation::{apply_step, click, ActuationSettings};
use crate::executor::control_law::ControlStep;
use crate::executor::input::{ClickOptions, InputSubstrate, MouseButton};
use crate::extraction::classify::{RowClassifier, TicketCategory};
use crate::extraction::rows::reconstruct_rows;
use crate::perception::traits::Perception;
use crate::perception::types::{CaptureFrame, ScreenRect};

const SCROLL_INTERVAL: Duration = Duration::from_millis(200);
const BOARD_SETTLE: Duration = Duration::from_secs(2);
const ACCEPT_PRESS: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedDelivery {
    pub category: TicketCategory,
    /// Text of the row's location fragment.
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    ControlNotFound,
}

impl<P: Perception, S: InputSubstrate> AgentSession<P, S> {
    pub async fn take_delivery(&mut self) -> EfClawResult<Option<AcceptedDelivery>> {
        let board = self.config.delivery_board.clone();
        self.prepare_board(&board).await?;

        if board.enabled_categories.is_empty() {
            tracing::warn!("no delivery category enabled, nothing to take");
            return Ok(None);
        }

        for pass in 1..=board.max_passes {
            if let Some(accepted) = self.take_delivery_pass().await? {
                tracing::info!(
                    pass,
                    category = ?accepted.category,
                    location = %accepted.location,
                    "delivery taken"
                );
                return Ok(Some(accepted));
            }
        }

        Err(EfClawError::BudgetExhausted(format!(
            "no qualifying delivery after {} passes",
            board.max_passes
        )))
    }

    /// Scrolls the listing to its far end at the screen center.
    pub async fn prepare_board(&mut self, board: &DeliveryBoardConfig) -> EfClawResult<()> {
        let frame = self.perception.capture().await?;
        let center = frame.center();

        let focus_only = ActuationSettings {
            activate_only: true,
            ..self.config.actuation.settings()
        };
        apply_step(&mut self.input, self.window, ControlStep::ZERO, &focus_only).await?;

        for _ in 0..board.scroll_count {
            self.input.scroll(center, board.scroll_amount)?;
            sleep(SCROLL_INTERVAL).await;
        }
        sleep(BOARD_SETTLE).await;
        Ok(())
    }

    /// One reconstruct/classify pass. Accepts the first actionable row, or
    /// refreshes the listing and returns `None`.
    pub async fn take_delivery_pass(&mut self) -> EfClawResult<Option<AcceptedDelivery>> {
        let board = self.config.delivery_board.clone();
        let frame = self.perception.capture().await?;
        let rows = reconstruct_rows(
            &self.perception,
            frame,
            &board.left_marker,
            &board.right_marker,
        )
        .await?;

        let classifier = RowClassifier::new(&board.rules, board.detail_index);
        let selected = classifier
            .select_actionable_row(&rows, &board.enabled_categories)
            .and_then(|(row, category)| {
                Some((row.action()?.center(), row.first()?.text.clone(), category))
            });

        if let Some((accept_at, location, category)) = selected {
            tracing::info!(
                ?category,
                %location,
                x = accept_at.x,
                y = accept_at.y,
                "accepting delivery"
            );
            let accept = ClickOptions {
                button: MouseButton::Left,
                down_time: ACCEPT_PRESS,
                move_back: true,
            };
            click(&mut self.input, Some(accept_at), accept).await?;
            sleep(Duration::from_millis(board.accept_settle_ms)).await;
            return Ok(Some(AcceptedDelivery { category, location }));
        }

        tracing::info!(rows = rows.len(), "no qualifying delivery, refreshing listing");
        self.refresh_listing(&board, frame).await?;
        Ok(None)
    }

    /// Clicks the refresh control, no sooner than the cooldown after the
    /// previous refresh. A control that cannot be found is not an error.
    pub async fn refresh_listing(
        &mut self,
        board: &DeliveryBoardConfig,
        frame: CaptureFrame,
    ) -> EfClawResult<RefreshOutcome> {
        let pattern = Regex::new(&regex::escape(&board.refresh_text))?;
        let region = ScreenRect::from_relative(frame, 0.5, 0.5, 1.0, 1.0);

        for attempt in 1..=board.refresh_attempts {
            let hits = self
                .perception
                .recognize_text(
                    Some(region),
                    Some(&pattern),
                    self.config.servo.recognize_timeout(),
                )
                .await?;

            if let Some(control) = hits.first() {
                let wait = self.refresh.remaining(Instant::now());
                if !wait.is_zero() {
                    tracing::debug!(?wait, "refresh cooling down");
                    sleep(wait).await;
                }
                let refresh = ClickOptions {
                    move_back: true,
                    ..ClickOptions::default()
                };
                click(&mut self.input, Some(control.center()), refresh).await?;
                self.refresh.record(Instant::now());
                sleep(Duration::from_millis(board.refresh_settle_ms)).await;
                return Ok(RefreshOutcome::Refreshed);
            }

            tracing::warn!(attempt, text = %board.refresh_text, "refresh control not found");
            sleep(Duration::from_millis(board.refresh_retry_delay_ms)).await;
        }
        Ok(RefreshOutcome::ControlNotFound)
    }
}
