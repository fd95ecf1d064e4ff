//! Per-aspect-ratio screen calibration for the delivery board listing.
//!
//! The listing is laid out differently for each supported capture ratio: the
//! vertical band holding the rows moves, while the three column bands stay at
//! fixed relative x positions. Ratios are matched exactly (reduced
//! width:height); anything else is `CalibrationUnsupported`.

use crate::errors::{EfClawError, EfClawResult};
use crate::perception::types::{CaptureFrame, ScreenRect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectRatio {
    /// 3:2
    Classic,
    /// 1:1
    Square,
    /// 9:16
    Portrait,
    /// 16:9
    Widescreen,
}

impl AspectRatio {
    pub fn detect(frame: CaptureFrame) -> EfClawResult<Self> {
        let unsupported = EfClawError::CalibrationUnsupported {
            width: frame.width,
            height: frame.height,
        };
        if frame.width == 0 || frame.height == 0 {
            return Err(unsupported);
        }
        let g = gcd(frame.width, frame.height);
        match (frame.width / g, frame.height / g) {
            (3, 2) => Ok(Self::Classic),
            (1, 1) => Ok(Self::Square),
            (9, 16) => Ok(Self::Portrait),
            (16, 9) => Ok(Self::Widescreen),
            _ => Err(unsupported),
        }
    }

    /// Relative `(y1, y2)` band containing the listing rows.
    pub fn row_band(self) -> (f64, f64) {
        match self {
            Self::Classic => (254.0 / 1280.0, 1134.0 / 1280.0),
            Self::Square => (0.1271, 0.8561 + (0.8561 - 0.1271) / 11.0),
            Self::Portrait => (0.075, 0.7916),
            Self::Widescreen => (290.0 / 1080.0, 926.0 / 1080.0 - (926.0 - 290.0) / 5.0 / 1080.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardColumn {
    /// Destination and "view location" link.
    Left,
    /// Fragility / reward details and the accept control.
    Right,
    /// One summary fragment per row.
    Middle,
}

impl BoardColumn {
    /// Relative `(x1, x2)` band of the column.
    pub fn x_band(self) -> (f64, f64) {
        match self {
            Self::Left => (0.4776, 0.5505),
            Self::Right => (0.8438, 0.9167),
            Self::Middle => (0.3141, 0.3641),
        }
    }
}

/// Pixel rectangles of the three listing columns for one capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardRegions {
    pub left: ScreenRect,
    pub right: ScreenRect,
    pub middle: ScreenRect,
}

impl BoardRegions {
    pub fn for_frame(frame: CaptureFrame) -> EfClawResult<Self> {
        let ratio = AspectRatio::detect(frame)?;
        let (y1, y2) = ratio.row_band();
        let rect = |column: BoardColumn| {
            let (x1, x2) = column.x_band();
            ScreenRect::from_relative(frame, x1, y1, x2, y2)
        };
        tracing::debug!(?ratio, width = frame.width, height = frame.height, "board calibration");
        Ok(Self {
            left: rect(BoardColumn::Left),
            right: rect(BoardColumn::Right),
            middle: rect(BoardColumn::Middle),
        })
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
