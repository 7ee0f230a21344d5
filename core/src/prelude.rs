use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::markers::{HitPolicy, Palette};

/// Detection threshold range accepted by the sensitivity control.
pub const SENSITIVITY_RANGE: RangeInclusive<u8> = 10..=80;
/// Marker diameter range in device pixels.
pub const MARKER_SIZE_RANGE: RangeInclusive<u8> = 10..=50;

/// Shared configuration for an overlay session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub default_sensitivity: u8,
    pub default_marker_size: u8,
    /// Multiplier applied to the visible marker radius when hit-testing taps.
    pub hit_slack: f64,
    /// Consecutive sequence positions sharing one palette color.
    pub band_size: usize,
    pub hit_policy: HitPolicy,
    pub palette: Palette,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_sensitivity: 50,
            default_marker_size: 24,
            hit_slack: 1.2,
            band_size: 20,
            hit_policy: HitPolicy::FirstMatch,
            palette: Palette::default(),
        }
    }
}

impl SessionConfig {
    /// Clamps every field into its accepted range.
    pub fn normalized(mut self) -> Self {
        self.default_sensitivity = clamp_sensitivity(self.default_sensitivity);
        self.default_marker_size = clamp_marker_size(self.default_marker_size);
        if !self.hit_slack.is_finite() || self.hit_slack <= 0.0 {
            self.hit_slack = 1.2;
        }
        self.band_size = self.band_size.max(1);
        self
    }
}

pub fn clamp_sensitivity(value: u8) -> u8 {
    value.clamp(*SENSITIVITY_RANGE.start(), *SENSITIVITY_RANGE.end())
}

pub fn clamp_marker_size(value: u8) -> u8 {
    value.clamp(*MARKER_SIZE_RANGE.start(), *MARKER_SIZE_RANGE.end())
}

/// Common error type for overlay operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    #[error("image dimensions not available yet")]
    ImageDecodeNotReady,
    #[error("detection transport failure: {0}")]
    DetectionTransportFailure(String),
    #[error("malformed detection response: {0}")]
    DetectionResponseMalformed(String),
    #[error("invalid reference frame {width}x{height}")]
    InvalidReference { width: f64, height: f64 },
    #[error("palette must contain at least one color")]
    EmptyPalette,
}

pub type OverlayResult<T> = Result<T, OverlayError>;
