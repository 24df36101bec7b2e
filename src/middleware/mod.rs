/// Middleware module
///
/// Custom middleware for request metrics.

mod metrics;

pub use metrics::{ApiMetrics, HitCounter};
