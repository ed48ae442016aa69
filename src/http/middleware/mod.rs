pub mod headers;
pub mod metrics;
pub mod rate_limit;

pub use headers::with_security_headers;
pub use metrics::track_metrics;
pub use rate_limit::{rate_limit, RateLimiter};
