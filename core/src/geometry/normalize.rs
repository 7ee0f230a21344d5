//! Conversion from pixel coordinates into percentage marker space.

use crate::geometry::{ImageDimensions, Marker, PixelPoint, ReferenceFrame};
use crate::prelude::{OverlayError, OverlayResult};

/// Maps `point` into `[0, 100]` percentage space relative to `frame`.
///
/// The result is not clamped; callers decide how to treat points outside the
/// frame.
pub fn normalize(point: PixelPoint, frame: ReferenceFrame) -> Marker {
    Marker::new(
        point.x / frame.width() * 100.0,
        point.y / frame.height() * 100.0,
    )
}

/// Normalizes a detector point against the natural image size.
///
/// Reports `ImageDecodeNotReady` while the natural size is unknown. Points the
/// detector places slightly outside the image are clamped onto its edge.
pub fn normalize_detection(
    point: PixelPoint,
    natural: Option<ImageDimensions>,
) -> OverlayResult<Marker> {
    let natural = natural.ok_or(OverlayError::ImageDecodeNotReady)?;
    if !point.is_finite() {
        return Err(OverlayError::DetectionResponseMalformed(format!(
            "non-finite point ({}, {})",
            point.x, point.y
        )));
    }
    Ok(normalize(point, natural.frame()?).clamped())
}

/// Normalizes a pointer position relative to the rendered image box.
///
/// Returns `None` when the pointer lies outside the box.
pub fn normalize_pointer(point: PixelPoint, rendered: ReferenceFrame) -> Option<Marker> {
    if !point.is_finite() {
        return None;
    }
    let marker = normalize(point, rendered);
    marker.is_within_bounds().then_some(marker)
}
