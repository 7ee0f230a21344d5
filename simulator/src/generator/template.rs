/// Centers of a hexagonally packed tube bundle filling a `width` x `height` frame.
///
/// Rows are `pitch * sqrt(3) / 2` apart and every other row is shifted by half
/// a pitch. Only centers at least half a pitch away from every edge are kept.
pub fn hex_lattice(width: f64, height: f64, pitch: f64) -> Vec<(f64, f64)> {
    if !(pitch > 0.0) || width < pitch || height < pitch {
        return Vec::new();
    }
    let radius = pitch / 2.0;
    let row_step = pitch * 3f64.sqrt() / 2.0;
    let mut centers = Vec::new();
    let mut row = 0usize;
    let mut y = radius;
    while y <= height - radius {
        let offset = if row % 2 == 1 { radius } else { 0.0 };
        let mut x = radius + offset;
        while x <= width - radius {
            centers.push((x, y));
            x += pitch;
        }
        row += 1;
        y += row_step;
    }
    centers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_stays_inside_frame() {
        let centers = hex_lattice(200.0, 120.0, 20.0);
        assert!(!centers.is_empty());
        assert!(centers
            .iter()
            .all(|&(x, y)| (10.0..=190.0).contains(&x) && (10.0..=110.0).contains(&y)));
    }

    #[test]
    fn odd_rows_are_offset() {
        let centers = hex_lattice(100.0, 100.0, 20.0);
        assert_eq!(centers[0], (10.0, 10.0));
        let second_row = centers.iter().find(|&&(_, y)| y > 10.0).unwrap();
        assert_eq!(second_row.0, 20.0);
    }

    #[test]
    fn frame_smaller_than_pitch_is_empty() {
        assert!(hex_lattice(10.0, 10.0, 20.0).is_empty());
        assert!(hex_lattice(100.0, 100.0, 0.0).is_empty());
    }
}
