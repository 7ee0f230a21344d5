use crate::generator::template::hex_lattice;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tubecore::detection::DetectionPoint;
use tubecore::geometry::ImageDimensions;

/// Configuration for the synthetic tube detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Tubes across the width of the image.
    pub columns: u32,
    /// Positional jitter as a fraction of the tube pitch.
    pub jitter: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            columns: 12,
            jitter: 0.05,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn normalized_columns(&self) -> u32 {
        self.columns.max(1)
    }
}

/// Seed derived from the generator seed and the uploaded bytes, so the same
/// upload always yields the same detections.
pub fn content_seed(config: &GeneratorConfig, content: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.seed.hash(&mut hasher);
    content.hash(&mut hasher);
    hasher.finish()
}

/// Synthetic detections for an image of size `dims`.
///
/// Each lattice center gets a pseudo confidence in `[0, 1)`; it is reported
/// when the confidence reaches `sensitivity / 100`, so a higher sensitivity
/// setting yields fewer detections.
pub fn build_detections(
    config: &GeneratorConfig,
    dims: ImageDimensions,
    sensitivity: u8,
    seed: u64,
) -> Vec<DetectionPoint> {
    let width = dims.width as f64;
    let height = dims.height as f64;
    let pitch = width / config.normalized_columns() as f64;
    let threshold = sensitivity as f64 / 100.0;
    let jitter = (config.jitter.abs() * pitch).max(f64::EPSILON);
    let mut rng = StdRng::seed_from_u64(seed);

    hex_lattice(width, height, pitch)
        .into_iter()
        .filter_map(|(x, y)| {
            let confidence: f64 = rng.gen();
            let dx = rng.gen_range(-jitter..jitter);
            let dy = rng.gen_range(-jitter..jitter);
            (confidence >= threshold).then(|| {
                DetectionPoint::new((x + dx).clamp(0.0, width), (y + dy).clamp(0.0, height))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detections_are_deterministic_for_a_seed() {
        let config = GeneratorConfig::default();
        let dims = ImageDimensions::new(640, 480);
        assert_eq!(
            build_detections(&config, dims, 50, 7),
            build_detections(&config, dims, 50, 7)
        );
    }

    #[test]
    fn higher_sensitivity_reports_fewer_tubes() {
        let config = GeneratorConfig::default();
        let dims = ImageDimensions::new(640, 480);
        let loose = build_detections(&config, dims, 10, 3).len();
        let strict = build_detections(&config, dims, 80, 3).len();
        assert!(strict <= loose);
        assert!(loose > 0);
    }

    #[test]
    fn detections_stay_within_image() {
        let config = GeneratorConfig {
            columns: 6,
            jitter: 0.4,
            seed: 11,
        };
        let dims = ImageDimensions::new(300, 200);
        assert!(build_detections(&config, dims, 10, 11)
            .iter()
            .all(|p| (0.0..=300.0).contains(&p.x) && (0.0..=200.0).contains(&p.y)));
    }

    #[test]
    fn content_seed_depends_on_bytes() {
        let config = GeneratorConfig::default();
        assert_ne!(content_seed(&config, b"a"), content_seed(&config, b"b"));
        assert_eq!(content_seed(&config, b"a"), content_seed(&config, b"a"));
    }
}
