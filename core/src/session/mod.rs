pub mod controller;
pub mod phase;

pub use controller::{Completion, OverlaySession, TapOutcome};
pub use phase::{SessionPhase, Settled};
