use crate::geometry::Marker;
use crate::prelude::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};

/// How a tap picks among several markers inside the tolerance radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPolicy {
    /// Lowest store index within tolerance.
    #[default]
    FirstMatch,
    /// Closest marker within tolerance; ties go to the lower index.
    Nearest,
}

impl HitPolicy {
    pub fn find(&self, point: &Marker, markers: &[Marker], tolerance: f64) -> Option<usize> {
        let mut candidates = markers
            .iter()
            .enumerate()
            .map(|(idx, marker)| (idx, marker.distance_to(point)))
            .filter(|&(_, distance)| distance < tolerance);

        match self {
            HitPolicy::FirstMatch => candidates.next().map(|(idx, _)| idx),
            HitPolicy::Nearest => candidates
                .fold(None, |best: Option<(usize, f64)>, (idx, distance)| match best {
                    Some((_, best_distance)) if best_distance <= distance => best,
                    _ => Some((idx, distance)),
                })
                .map(|(idx, _)| idx),
        }
    }
}

/// Index of the first marker strictly closer than `tolerance` to `point`.
pub fn find_hit(point: &Marker, markers: &[Marker], tolerance: f64) -> Option<usize> {
    HitPolicy::FirstMatch.find(point, markers, tolerance)
}

/// Converts the on-screen marker size into a tolerance in percentage units.
pub fn tap_tolerance(marker_size: u8, rendered_width: f64, slack: f64) -> OverlayResult<f64> {
    if !rendered_width.is_finite() || rendered_width <= 0.0 {
        return Err(OverlayError::InvalidReference {
            width: rendered_width,
            height: 0.0,
        });
    }
    Ok(marker_size as f64 / rendered_width * 100.0 * slack)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers(points: &[(f64, f64)]) -> Vec<Marker> {
        points.iter().map(|&(x, y)| Marker::new(x, y)).collect()
    }

    #[test]
    fn tap_near_marker_hits_it() {
        let store = markers(&[(10.0, 10.0), (90.0, 90.0)]);
        assert_eq!(find_hit(&Marker::new(10.5, 10.2), &store, 1.0), Some(0));
    }

    #[test]
    fn tap_far_from_everything_misses() {
        let store = markers(&[(10.0, 10.0), (90.0, 90.0)]);
        assert_eq!(find_hit(&Marker::new(50.0, 50.0), &store, 1.0), None);
    }

    #[test]
    fn distance_equal_to_tolerance_is_not_a_hit() {
        let store = markers(&[(10.0, 10.0)]);
        assert_eq!(find_hit(&Marker::new(11.0, 10.0), &store, 1.0), None);
    }

    #[test]
    fn first_match_prefers_lower_index_over_closer_marker() {
        let store = markers(&[(10.0, 10.0), (12.0, 10.0)]);
        let tap = Marker::new(11.8, 10.0);
        assert_eq!(HitPolicy::FirstMatch.find(&tap, &store, 3.0), Some(0));
        assert_eq!(HitPolicy::Nearest.find(&tap, &store, 3.0), Some(1));
    }

    #[test]
    fn empty_store_never_hits() {
        assert_eq!(HitPolicy::Nearest.find(&Marker::new(1.0, 1.0), &[], 50.0), None);
    }

    #[test]
    fn tolerance_scales_with_marker_size_and_width() {
        let tolerance = tap_tolerance(24, 400.0, 1.2).unwrap();
        assert!((tolerance - 7.2).abs() < 1e-9);
        assert!(tap_tolerance(24, 0.0, 1.2).is_err());
    }
}
