use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{EfClawError, EfClawResult};
use crate::executor::actuation::ActuationSettings;
use crate::executor::control_law::StepBounds;
use crate::extraction::classify::{CategoryRule, TicketCategory};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub servo: ServoConfig,
    #[serde(default)]
    pub actuation: ActuationConfig,
    #[serde(default)]
    pub delivery_board: DeliveryBoardConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub zip_line: ZipLineConfig,
}

/// Alignment loop tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServoConfig {
    /// Max |dx| and |dy| (px) between target centroid and screen center.
    #[serde(default = "default_tolerance")]
    pub tolerance_px: i32,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_recognize_timeout_ms")]
    pub recognize_timeout_ms: u64,
    /// Vertical mismatch between the on-screen reference and the capture
    /// origin, in pixels at `reference_height`. Subtracted from every hit.
    #[serde(default = "default_capture_offset_px")]
    pub capture_offset_px: u32,
    #[serde(default = "default_reference_height")]
    pub reference_height: u32,
    /// `base_step` used while steering toward a (possibly stale) target.
    #[serde(default = "default_steer_base_step")]
    pub steer_base_step: u32,
    #[serde(default)]
    pub step: StepBounds,
    #[serde(default = "default_nudge_max_offset")]
    pub nudge_max_offset: i32,
    #[serde(default = "default_nudge_delay_ms")]
    pub nudge_delay_ms: u64,
}

fn default_tolerance() -> i32 {
    100
}

fn default_max_iterations() -> u32 {
    50
}

fn default_recognize_timeout_ms() -> u64 {
    2000
}

fn default_capture_offset_px() -> u32 {
    525 - 486
}

fn default_reference_height() -> u32 {
    1080
}

fn default_steer_base_step() -> u32 {
    100
}

fn default_nudge_max_offset() -> i32 {
    50
}

fn default_nudge_delay_ms() -> u64 {
    100
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            tolerance_px: default_tolerance(),
            max_iterations: default_max_iterations(),
            recognize_timeout_ms: default_recognize_timeout_ms(),
            capture_offset_px: default_capture_offset_px(),
            reference_height: default_reference_height(),
            steer_base_step: default_steer_base_step(),
            step: StepBounds::default(),
            nudge_max_offset: default_nudge_max_offset(),
            nudge_delay_ms: default_nudge_delay_ms(),
        }
    }
}

impl ServoConfig {
    pub fn recognize_timeout(&self) -> Duration {
        Duration::from_millis(self.recognize_timeout_ms)
    }

    pub fn nudge_delay(&self) -> Duration {
        Duration::from_millis(self.nudge_delay_ms)
    }

    /// Offset scaled to a capture of `height` pixels, truncated.
    pub fn capture_offset(&self, height: u32) -> i32 {
        (height as u64 * self.capture_offset_px as u64 / self.reference_height.max(1) as u64) as i32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActuationConfig {
    #[serde(default = "default_true")]
    pub activate_window: bool,
    #[serde(default = "default_inter_step_delay_ms")]
    pub inter_step_delay_ms: u64,
    #[serde(default = "default_step_count")]
    pub step_count: u32,
}

fn default_true() -> bool {
    true
}

fn default_inter_step_delay_ms() -> u64 {
    20
}

fn default_step_count() -> u32 {
    3
}

impl Default for ActuationConfig {
    fn default() -> Self {
        Self {
            activate_window: true,
            inter_step_delay_ms: default_inter_step_delay_ms(),
            step_count: default_step_count(),
        }
    }
}

impl ActuationConfig {
    pub fn settings(&self) -> ActuationSettings {
        ActuationSettings {
            activate_window: self.activate_window,
            activate_only: false,
            inter_step_delay: Duration::from_millis(self.inter_step_delay_ms),
            step_count: self.step_count,
        }
    }
}

/// Delivery board ("take delivery") listing and refresh behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryBoardConfig {
    /// Closes a left-column group ("view location" link).
    #[serde(default = "default_left_marker")]
    pub left_marker: String,
    /// Closes a right-column group (the accept control).
    #[serde(default = "default_right_marker")]
    pub right_marker: String,
    #[serde(default = "default_enabled_categories")]
    pub enabled_categories: Vec<TicketCategory>,
    #[serde(default = "CategoryRule::defaults")]
    pub rules: Vec<CategoryRule>,
    /// Row fragment the accept/reject keywords are tested against.
    #[serde(default = "default_detail_index")]
    pub detail_index: usize,
    #[serde(default = "default_refresh_text")]
    pub refresh_text: String,
    #[serde(default = "default_refresh_cooldown_ms")]
    pub refresh_cooldown_ms: u64,
    #[serde(default = "default_refresh_settle_ms")]
    pub refresh_settle_ms: u64,
    #[serde(default = "default_refresh_retry_delay_ms")]
    pub refresh_retry_delay_ms: u64,
    #[serde(default = "default_refresh_attempts")]
    pub refresh_attempts: u32,
    #[serde(default = "default_accept_settle_ms")]
    pub accept_settle_ms: u64,
    /// Upper bound on reconstruct/refresh passes per `take_delivery` call.
    #[serde(default = "default_max_passes")]
    pub max_passes: u32,
    #[serde(default = "default_scroll_count")]
    pub scroll_count: u32,
    #[serde(default = "default_scroll_amount")]
    pub scroll_amount: i32,
}

fn default_left_marker() -> String {
    "查看位置".into()
}

fn default_right_marker() -> String {
    "接取运送委托".into()
}

fn default_enabled_categories() -> Vec<TicketCategory> {
    vec![TicketCategory::Wuling]
}

fn default_detail_index() -> usize {
    2
}

fn default_refresh_text() -> String {
    "刷新".into()
}

fn default_refresh_cooldown_ms() -> u64 {
    5400
}

fn default_refresh_settle_ms() -> u64 {
    3000
}

fn default_refresh_retry_delay_ms() -> u64 {
    1000
}

fn default_refresh_attempts() -> u32 {
    2
}

fn default_accept_settle_ms() -> u64 {
    2000
}

fn default_max_passes() -> u32 {
    500
}

fn default_scroll_count() -> u32 {
    6
}

fn default_scroll_amount() -> i32 {
    -8
}

impl Default for DeliveryBoardConfig {
    fn default() -> Self {
        Self {
            left_marker: default_left_marker(),
            right_marker: default_right_marker(),
            enabled_categories: default_enabled_categories(),
            rules: CategoryRule::defaults(),
            detail_index: default_detail_index(),
            refresh_text: default_refresh_text(),
            refresh_cooldown_ms: default_refresh_cooldown_ms(),
            refresh_settle_ms: default_refresh_settle_ms(),
            refresh_retry_delay_ms: default_refresh_retry_delay_ms(),
            refresh_attempts: default_refresh_attempts(),
            accept_settle_ms: default_accept_settle_ms(),
            max_passes: default_max_passes(),
            scroll_count: default_scroll_count(),
            scroll_amount: default_scroll_amount(),
        }
    }
}

impl DeliveryBoardConfig {
    pub fn refresh_cooldown(&self) -> Duration {
        Duration::from_millis(self.refresh_cooldown_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Separates header fragments from entry candidates.
    #[serde(default = "default_panel_marker")]
    pub marker: String,
}

fn default_panel_marker() -> String {
    "附加技能".into()
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            marker: default_panel_marker(),
        }
    }
}

/// Zip-line route runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZipLineConfig {
    /// Route name -> comma separated leg distances, e.g. "108,64,109".
    #[serde(default = "default_routes")]
    pub routes: BTreeMap<String, String>,
    #[serde(default = "default_selected_route")]
    pub selected_route: String,
    /// Prompt shown while mounted and idle on a zip line.
    #[serde(default = "default_arrival_text")]
    pub arrival_text: String,
    #[serde(default = "default_leg_timeout_secs")]
    pub leg_timeout_secs: u64,
    #[serde(default = "default_mount_timeout_secs")]
    pub mount_timeout_secs: u64,
    #[serde(default = "default_mount_poll_ms")]
    pub mount_poll_ms: u64,
    #[serde(default = "default_ride_key")]
    pub ride_key: char,
    #[serde(default = "default_ride_key_interval_ms")]
    pub ride_key_interval_ms: u64,
}

fn default_routes() -> BTreeMap<String, String> {
    [
        ("物资回收站左下", "108,64,109,60"),
        ("物资回收站", "108,64,109"),
        ("武陵城深处", "108,64,108,59"),
        ("武陵城右边", "108,106"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn default_selected_route() -> String {
    "物资回收站左下".into()
}

fn default_arrival_text() -> String {
    "向目标移动".into()
}

fn default_leg_timeout_secs() -> u64 {
    60
}

fn default_mount_timeout_secs() -> u64 {
    300
}

fn default_mount_poll_ms() -> u64 {
    2000
}

fn default_ride_key() -> char {
    'e'
}

fn default_ride_key_interval_ms() -> u64 {
    100
}

impl Default for ZipLineConfig {
    fn default() -> Self {
        Self {
            routes: default_routes(),
            selected_route: default_selected_route(),
            arrival_text: default_arrival_text(),
            leg_timeout_secs: default_leg_timeout_secs(),
            mount_timeout_secs: default_mount_timeout_secs(),
            mount_poll_ms: default_mount_poll_ms(),
            ride_key: default_ride_key(),
            ride_key_interval_ms: default_ride_key_interval_ms(),
        }
    }
}

impl ZipLineConfig {
    pub fn selected_legs(&self) -> EfClawResult<Vec<u32>> {
        let route = self.routes.get(&self.selected_route).ok_or_else(|| {
            EfClawError::Config(format!("unknown zip-line route '{}'", self.selected_route))
        })?;
        crate::tasks::zip_line::parse_route(route)
    }
}

impl AppConfig {
    pub fn validate(&self) -> EfClawResult<()> {
        self.servo.step.validate()?;
        if self.servo.tolerance_px < 0 {
            return Err(EfClawError::Config("tolerance_px must not be negative".into()));
        }
        if self.actuation.step_count == 0 {
            return Err(EfClawError::Config("actuation.step_count must be positive".into()));
        }
        self.zip_line.selected_legs()?;
        Ok(())
    }
}

fn resolve_config_path() -> EfClawResult<PathBuf> {
    if let Ok(explicit) = std::env::var("EFCLAW_CONFIG") {
        let candidate = PathBuf::from(explicit);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config from EFCLAW_CONFIG");
            return Ok(candidate);
        }
        tracing::warn!(path = %candidate.display(), "EFCLAW_CONFIG points to a missing file");
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("config.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(EfClawError::Config(
        "config.toml not found via EFCLAW_CONFIG, next to the executable or in the cwd".into(),
    ))
}

pub fn load_config() -> EfClawResult<AppConfig> {
    let path = resolve_config_path()?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> EfClawResult<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    tracing::info!(
        path = %path.display(),
        route = %config.zip_line.selected_route,
        categories = ?config.delivery_board.enabled_categories,
        "config loaded"
    );
    Ok(config)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> EfClawResult<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
