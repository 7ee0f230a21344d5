//! Positional visual encoding: sequence labels and color bands.

use crate::geometry::Marker;
use crate::prelude::{OverlayError, OverlayResult};
use serde::{Deserialize, Serialize};

/// Consecutive sequence positions that share one palette color.
pub const DEFAULT_BAND_SIZE: usize = 20;

/// Render attributes derived from a marker's position in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerEncoding {
    /// 1-based sequence number.
    pub label: usize,
    /// Index into the palette.
    pub color_band: usize,
}

/// Encodes `index` with the default band size.
pub fn encode(index: usize, palette_size: usize) -> MarkerEncoding {
    encode_with_band(index, palette_size, DEFAULT_BAND_SIZE)
}

pub fn encode_with_band(index: usize, palette_size: usize, band_size: usize) -> MarkerEncoding {
    MarkerEncoding {
        label: index + 1,
        color_band: (index / band_size.max(1)) % palette_size.max(1),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Ordered, non-empty list of band colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgba>", into = "Vec<Rgba>")]
pub struct Palette {
    colors: Vec<Rgba>,
}

impl Palette {
    pub fn new(colors: Vec<Rgba>) -> OverlayResult<Self> {
        if colors.is_empty() {
            return Err(OverlayError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color(&self, band: usize) -> Rgba {
        self.colors[band % self.colors.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: vec![
                Rgba::new(34, 197, 94, 0.9),  // green
                Rgba::new(59, 130, 246, 0.9), // blue
                Rgba::new(168, 85, 247, 0.9), // purple
                Rgba::new(249, 115, 22, 0.9), // orange
                Rgba::new(239, 68, 68, 0.9),  // red
                Rgba::new(20, 184, 166, 0.9), // teal
                Rgba::new(236, 72, 153, 0.9), // pink
                Rgba::new(234, 179, 8, 0.9),  // yellow
            ],
        }
    }
}

impl TryFrom<Vec<Rgba>> for Palette {
    type Error = OverlayError;

    fn try_from(colors: Vec<Rgba>) -> Result<Self, Self::Error> {
        Palette::new(colors)
    }
}

impl From<Palette> for Vec<Rgba> {
    fn from(palette: Palette) -> Self {
        palette.colors
    }
}

/// One circle of the overlay, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerGlyph {
    /// Circle center in percentage space.
    pub center: Marker,
    pub label: usize,
    pub color_band: usize,
    pub color: Rgba,
    /// Diameter in device pixels.
    pub diameter: f32,
    pub font_size: f32,
}

/// Derives the glyph list for a marker sequence.
pub fn glyphs(
    markers: &[Marker],
    palette: &Palette,
    band_size: usize,
    marker_size: u8,
) -> Vec<MarkerGlyph> {
    let diameter = marker_size as f32;
    markers
        .iter()
        .enumerate()
        .map(|(index, marker)| {
            let encoding = encode_with_band(index, palette.len(), band_size);
            MarkerGlyph {
                center: *marker,
                label: encoding.label,
                color_band: encoding.color_band,
                color: palette.color(encoding.color_band),
                diameter,
                font_size: diameter * 0.5,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_band_covers_twenty_positions() {
        assert_eq!(encode(0, 5), MarkerEncoding { label: 1, color_band: 0 });
        assert_eq!(encode(19, 5).color_band, 0);
        assert_eq!(encode(20, 5), MarkerEncoding { label: 21, color_band: 1 });
    }

    #[test]
    fn bands_cycle_past_palette_length() {
        assert_eq!(encode(100, 5).color_band, 0);
        assert_eq!(encode(120, 5).color_band, 1);
    }

    #[test]
    fn two_markers_share_first_band() {
        let markers = vec![Marker::new(10.0, 10.0), Marker::new(90.0, 90.0)];
        let palette = Palette::new(Palette::default().colors[..5].to_vec()).unwrap();
        let glyphs = glyphs(&markers, &palette, DEFAULT_BAND_SIZE, 24);
        let labels: Vec<_> = glyphs.iter().map(|g| g.label).collect();
        let bands: Vec<_> = glyphs.iter().map(|g| g.color_band).collect();
        assert_eq!(labels, vec![1, 2]);
        assert_eq!(bands, vec![0, 0]);
        assert_eq!(glyphs[0].font_size, 12.0);
    }

    #[test]
    fn encoding_is_stable_without_mutation() {
        let markers: Vec<_> = (0..45).map(|i| Marker::new(i as f64, i as f64)).collect();
        let palette = Palette::default();
        assert_eq!(
            glyphs(&markers, &palette, DEFAULT_BAND_SIZE, 20),
            glyphs(&markers, &palette, DEFAULT_BAND_SIZE, 20)
        );
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert_eq!(Palette::new(Vec::new()), Err(OverlayError::EmptyPalette));
        assert!(serde_json::from_str::<Palette>("[]").is_err());
    }

    #[test]
    fn default_palette_starts_green() {
        assert_eq!(Palette::default().color(0), Rgba::new(34, 197, 94, 0.9));
        assert_eq!(Palette::default().color(8), Palette::default().color(0));
    }
}
