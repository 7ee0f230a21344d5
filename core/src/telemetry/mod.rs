pub mod events;
pub mod metrics;

pub use events::EventLog;
pub use metrics::{DetectionMetrics, MetricsSnapshot};
