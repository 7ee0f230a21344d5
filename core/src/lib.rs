//! Marker reconciliation and interactive overlay core for tube counting.
//!
//! Detection points arrive in image pixels, are normalized into percentage
//! space, and live in an ordered marker store that the user edits by tapping.
//! Labels and color bands are derived from each marker's position.

pub mod detection;
pub mod geometry;
pub mod markers;
pub mod prelude;
pub mod session;
pub mod telemetry;

pub use prelude::{OverlayError, OverlayResult, SessionConfig};
pub use session::{Completion, OverlaySession, SessionPhase, TapOutcome};
