use serde::{Deserialize, Serialize};
use tubecore::detection::DetectionPoint;
use tubecore::geometry::ImageDimensions;

/// Query string of `POST /detect`.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectQuery {
    pub sensitivity: Option<u8>,
}

/// Body of a successful detection; `points` is what clients require.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectReply {
    pub points: Vec<DetectionPoint>,
    pub count: usize,
    pub width: u32,
    pub height: u32,
    pub sensitivity: u8,
}

impl DetectReply {
    pub fn new(points: Vec<DetectionPoint>, dims: ImageDimensions, sensitivity: u8) -> Self {
        Self {
            count: points.len(),
            points,
            width: dims.width,
            height: dims.height,
            sensitivity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: String,
}
