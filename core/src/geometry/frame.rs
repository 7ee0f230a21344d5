use crate::prelude::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};

/// Intrinsic pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn longest_side(&self) -> u32 {
        self.width.max(self.height)
    }

    /// Reference frame for normalizing detector output.
    pub fn frame(&self) -> OverlayResult<ReferenceFrame> {
        ReferenceFrame::new(self.width as f64, self.height as f64)
    }
}

/// A validated width/height pair used as the denominator of a normalization.
///
/// Either the natural size of an image or the on-screen box it is rendered in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    width: f64,
    height: f64,
}

impl ReferenceFrame {
    pub fn new(width: f64, height: f64) -> OverlayResult<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Ok(Self { width, height })
        } else {
            Err(OverlayError::InvalidReference { width, height })
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}
