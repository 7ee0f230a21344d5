pub mod point;
pub mod request;
pub mod response;

pub use point::DetectionPoint;
pub use request::{DetectionTicket, ImageId, RequestToken};
pub use response::{DetectionError, DetectionReply, DetectionResponse};
