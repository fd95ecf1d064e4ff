use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::errors::EfClawResult;
use crate::perception::types::{CaptureFrame, DetectedRegion, ScreenRect};

/// Text / visual-feature recognition over the live game capture.
///
/// A clean miss is an empty `Vec`. Only infrastructure failures (capture lost,
/// engine crashed) come back as `Err`.
#[async_trait]
pub trait Perception: Send + Sync {
    /// Size of the frame the next recognition calls will run against.
    async fn capture(&self) -> EfClawResult<CaptureFrame>;

    /// Recognizes text inside `region` (whole frame when `None`), keeping only
    /// fragments matching `pattern` when one is given. Keeps retrying until a
    /// match or `timeout`; a zero timeout is a single pass.
    async fn recognize_text(
        &self,
        region: Option<ScreenRect>,
        pattern: Option<&Regex>,
        timeout: Duration,
    ) -> EfClawResult<Vec<DetectedRegion>>;

    /// Template / feature match for a named asset.
    async fn recognize_feature(
        &self,
        region: Option<ScreenRect>,
        feature_id: &str,
    ) -> EfClawResult<Vec<DetectedRegion>>;
}
