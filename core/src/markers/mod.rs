pub mod encode;
pub mod hit_test;
pub mod store;

pub use encode::{
    encode, encode_with_band, glyphs, MarkerEncoding, MarkerGlyph, Palette, Rgba, DEFAULT_BAND_SIZE,
};
pub use hit_test::{find_hit, tap_tolerance, HitPolicy};
pub use store::MarkerStore;
