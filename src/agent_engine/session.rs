use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::errors::EfClawResult;
use crate::executor::input::{InputSubstrate, WindowHandle};
use crate::extraction::classify::RefreshThrottle;
use crate::extraction::panel::{read_panel, PanelParser, PanelReading};
use crate::perception::traits::Perception;
use crate::perception::types::{DetectedRegion, ScreenRect};

/// One automation session against one game window.
///
/// Owns the collaborators plus the only state that survives a control cycle:
/// the last target fix used when recognition drops out, and the timestamp of
/// the last listing refresh. Nothing here is shared; run one operation at a
/// time per window.
pub struct AgentSession<P, S> {
    pub(crate) perception: P,
    pub(crate) input: S,
    pub(crate) window: WindowHandle,
    pub(crate) config: AppConfig,
    pub(crate) last_target: Option<DetectedRegion>,
    pub(crate) refresh: RefreshThrottle,
    pub(crate) rng: StdRng,
}

impl<P: Perception, S: InputSubstrate> AgentSession<P, S> {
    pub fn new(perception: P, input: S, window: WindowHandle, config: AppConfig) -> Self {
        let refresh = RefreshThrottle::new(config.delivery_board.refresh_cooldown());
        Self {
            perception,
            input,
            window,
            config,
            last_target: None,
            refresh,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic exploratory nudges.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn perception(&self) -> &P {
        &self.perception
    }

    pub fn input(&self) -> &S {
        &self.input
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn window(&self) -> WindowHandle {
        self.window
    }

    pub fn last_target(&self) -> Option<&DetectedRegion> {
        self.last_target.as_ref()
    }

    pub fn clear_last_target(&mut self) {
        self.last_target = None;
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.refresh.last_refresh()
    }

    /// Reads the essence panel inside `region` (whole frame when `None`).
    pub async fn read_panel(
        &self,
        region: Option<ScreenRect>,
    ) -> EfClawResult<Option<PanelReading>> {
        let parser = PanelParser::new(self.config.panel.marker.as_str());
        read_panel(&self.perception, &parser, region).await
    }
}
