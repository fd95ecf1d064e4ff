use serde::{Deserialize, Serialize};

/// Integer point in screen-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: i32,
    pub y: i32,
}

impl Point2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Size of the current screen capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureFrame {
    pub width: u32,
    pub height: u32,
}

impl CaptureFrame {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Reference point the alignment loop steers targets onto.
    pub fn center(&self) -> Point2D {
        Point2D::new((self.width / 2) as i32, (self.height / 2) as i32)
    }
}

/// Pixel rectangle used to bound a perception query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from relative corners `(x1, y1)`–`(x2, y2)` in 0.0–1.0.
    /// Pixel values are truncated, matching how capture boxes are cut.
    pub fn from_relative(frame: CaptureFrame, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let w = frame.width as f64;
        let h = frame.height as f64;
        let px1 = (x1 * w) as i32;
        let py1 = (y1 * h) as i32;
        let px2 = (x2 * w) as i32;
        let py2 = (y2 * h) as i32;
        Self::new(px1, py1, (px2 - px1).max(0), (py2 - py1).max(0))
    }
}

/// One recognition hit: bounding box, recognized text (or feature label), confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub text: String,
    pub confidence: f32,
}

impl DetectedRegion {
    pub fn new(x: i32, y: i32, width: i32, height: i32, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            text: text.into(),
            confidence: 1.0,
        }
    }

    /// Centroid, using integer halving of the box size.
    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
