use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tubecore::detection::DetectionPoint;
use tubecore::geometry::ImageDimensions;

/// One user or network event replayed against a session.
///
/// `request` fields are 1-based positions in issue order; when omitted the
/// most recently issued request is meant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptStep {
    Select,
    Ready {
        width: u32,
        height: u32,
    },
    Respond {
        #[serde(default)]
        request: Option<usize>,
        points: Vec<DetectionPoint>,
        #[serde(default)]
        frame: Option<ImageDimensions>,
    },
    /// Respond with synthetic detections for an image of the given size.
    Generate {
        #[serde(default)]
        request: Option<usize>,
        width: u32,
        height: u32,
    },
    Fail {
        #[serde(default)]
        request: Option<usize>,
        #[serde(default)]
        malformed: bool,
        message: String,
    },
    Drag {
        sensitivity: u8,
    },
    Commit {
        #[serde(default)]
        sensitivity: Option<u8>,
    },
    /// Pointer position in pixels of a rendered box `width` x `height`.
    Tap {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    MarkerSize {
        size: u8,
    },
    Undo,
    ClearMarkers,
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionScript {
    pub steps: Vec<ScriptStep>,
}

impl SessionScript {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading session script {}", path_ref.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing session script {}", path_ref.display()))
    }

    /// Select an image, detect, then correct the count by hand.
    pub fn demo(dims: ImageDimensions) -> Self {
        let width = dims.width as f64;
        let height = dims.height as f64;
        Self {
            steps: vec![
                ScriptStep::Select,
                ScriptStep::Ready {
                    width: dims.width,
                    height: dims.height,
                },
                ScriptStep::Generate {
                    request: None,
                    width: dims.width,
                    height: dims.height,
                },
                ScriptStep::Tap {
                    x: width * 0.5,
                    y: height * 0.5,
                    width,
                    height,
                },
                ScriptStep::Commit {
                    sensitivity: Some(30),
                },
                ScriptStep::Generate {
                    request: None,
                    width: dims.width,
                    height: dims.height,
                },
            ],
        }
    }
}
