use crate::geometry::{ImageDimensions, PixelPoint};
use serde::{Deserialize, Serialize};

/// Tube center reported by the detector, in pixels of the image it was sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionPoint {
    pub x: f64,
    pub y: f64,
}

impl DetectionPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Maps the point from the `from` pixel grid onto the `to` pixel grid.
    ///
    /// Used when the uploaded image was downscaled before detection.
    pub fn rescaled(self, from: ImageDimensions, to: ImageDimensions) -> Self {
        if from == to || from.width == 0 || from.height == 0 {
            return self;
        }
        Self {
            x: self.x * to.width as f64 / from.width as f64,
            y: self.y * to.height as f64 / from.height as f64,
        }
    }
}

impl From<DetectionPoint> for PixelPoint {
    fn from(point: DetectionPoint) -> Self {
        PixelPoint::new(point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_maps_downscaled_points_back_to_natural_grid() {
        let point = DetectionPoint::new(512.0, 256.0).rescaled(
            ImageDimensions::new(1024, 768),
            ImageDimensions::new(4096, 3072),
        );
        assert_eq!(point, DetectionPoint::new(2048.0, 1024.0));
    }

    #[test]
    fn rescale_between_identical_grids_is_identity() {
        let dims = ImageDimensions::new(300, 200);
        let point = DetectionPoint::new(12.5, 7.25);
        assert_eq!(point.rescaled(dims, dims), point);
    }
}
