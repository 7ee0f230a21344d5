use crate::detection::DetectionPoint;
use crate::geometry::ImageDimensions;
use crate::prelude::OverlayError;
use serde::{Deserialize, Serialize};

/// Failure of a single detection call.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectionError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<DetectionError> for OverlayError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::Transport(msg) => OverlayError::DetectionTransportFailure(msg),
            DetectionError::Malformed(msg) => OverlayError::DetectionResponseMalformed(msg),
        }
    }
}

/// JSON body returned by the detection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub points: Vec<DetectionPoint>,
}

impl DetectionResponse {
    /// Parses and validates a response body.
    ///
    /// A missing `points` field, a non-list value or a non-finite coordinate
    /// are all reported as `Malformed`.
    pub fn parse(body: &[u8]) -> Result<Self, DetectionError> {
        let response: DetectionResponse = serde_json::from_slice(body)
            .map_err(|err| DetectionError::Malformed(err.to_string()))?;
        if let Some(bad) = response
            .points
            .iter()
            .find(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(DetectionError::Malformed(format!(
                "non-finite point ({}, {})",
                bad.x, bad.y
            )));
        }
        Ok(response)
    }
}

/// A successful detection result ready to hand back to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionReply {
    pub points: Vec<DetectionPoint>,
    /// Pixel grid the points are expressed in, when it differs from the
    /// natural image (a downscaled upload). `None` means natural pixels.
    pub frame: Option<ImageDimensions>,
}

impl DetectionReply {
    pub fn natural(points: Vec<DetectionPoint>) -> Self {
        Self {
            points,
            frame: None,
        }
    }

    pub fn in_frame(points: Vec<DetectionPoint>, frame: ImageDimensions) -> Self {
        Self {
            points,
            frame: Some(frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_point_list() {
        let response =
            DetectionResponse::parse(br#"{"points": [{"x": 1.5, "y": 2}, {"x": 3, "y": 4}]}"#)
                .unwrap();
        assert_eq!(response.points.len(), 2);
        assert_eq!(response.points[0], DetectionPoint::new(1.5, 2.0));
    }

    #[test]
    fn parse_tolerates_extra_fields() {
        let response =
            DetectionResponse::parse(br#"{"count": 1, "points": [{"x": 1, "y": 1}]}"#).unwrap();
        assert_eq!(response.points.len(), 1);
    }

    #[test]
    fn missing_points_field_is_malformed() {
        let err = DetectionResponse::parse(br#"{"detections": []}"#).unwrap_err();
        assert!(matches!(err, DetectionError::Malformed(_)));
    }

    #[test]
    fn point_without_coordinate_is_malformed() {
        let err = DetectionResponse::parse(br#"{"points": [{"x": 1}]}"#).unwrap_err();
        assert!(matches!(err, DetectionError::Malformed(_)));
    }

    #[test]
    fn detection_error_maps_onto_overlay_error() {
        let err: OverlayError = DetectionError::Transport("refused".into()).into();
        assert_eq!(err, OverlayError::DetectionTransportFailure("refused".into()));
    }
}
