pub mod frame;
pub mod normalize;
pub mod point;

pub use frame::{ImageDimensions, ReferenceFrame};
pub use normalize::{normalize, normalize_detection, normalize_pointer};
pub use point::{Marker, PixelPoint};
