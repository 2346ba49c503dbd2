//! Resilience features
//!
//! Retry/failure classification for API calls plus the structured logging
//! that records what the retry loop did.

pub mod config;
pub mod logging;
pub mod retry;

pub use config::{LogLevel, MonitoringConfig, ResilienceConfig, ResilienceConfigBuilder};
pub use logging::{ApiLogger, EventSink, OperationContext, OperationMetrics};
pub use retry::{Completion, FailureClass, RetryConfig, RetryPolicy};
