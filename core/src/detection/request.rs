use serde::{Deserialize, Serialize};
use std::fmt;

/// Monotonic tag attached to every detection request a session issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies one image selection within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageId(pub u64);

/// Everything the caller needs to perform one detection call.
///
/// The response must be handed back together with `token`; the session
/// discards it if a newer request has been issued in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionTicket {
    pub token: RequestToken,
    pub image: ImageId,
    pub sensitivity: u8,
}

impl DetectionTicket {
    /// Query parameters sent alongside the uploaded image.
    pub fn query(&self) -> [(&'static str, String); 1] {
        [("sensitivity", self.sensitivity.to_string())]
    }
}
