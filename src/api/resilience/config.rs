//! Resilience configuration with builder pattern
//!
//! Bundles the retry policy and the monitoring settings a client runs with.

use super::retry::RetryConfig;
use std::time::Duration;

/// Resilience configuration for API calls
#[derive(Debug, Clone, Default)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub monitoring: MonitoringConfig,
}

/// Monitoring and logging configuration
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub correlation_ids: bool,
    pub request_logging: bool,
    pub performance_metrics: bool,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            correlation_ids: true,
            request_logging: true,
            performance_metrics: true,
            log_level: LogLevel::Info,
        }
    }
}

impl ResilienceConfig {
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// Bounded retries and quieter logs for production
    pub fn conservative() -> Self {
        Self {
            retry: RetryConfig::conservative(),
            monitoring: MonitoringConfig {
                log_level: LogLevel::Warn,
                ..MonitoringConfig::default()
            },
        }
    }

    /// Generous retries and verbose logs for lab arrays
    pub fn development() -> Self {
        Self {
            retry: RetryConfig::aggressive(),
            monitoring: MonitoringConfig {
                log_level: LogLevel::Debug,
                ..MonitoringConfig::default()
            },
        }
    }

    /// One attempt per call and no request logging (for testing)
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            monitoring: MonitoringConfig {
                correlation_ids: false,
                request_logging: false,
                performance_metrics: false,
                log_level: LogLevel::Error,
            },
        }
    }
}

/// Builder for ResilienceConfig
#[derive(Debug, Default)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Finite retry budget
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.retry.max_retries = Some(retries);
        self
    }

    /// Retry without an attempt limit
    pub fn unlimited_retries(mut self) -> Self {
        self.config.retry.max_retries = None;
        self
    }

    /// Bound the wall clock one call may spend retrying
    pub fn max_elapsed(mut self, max_elapsed: Duration) -> Self {
        self.config.retry.max_elapsed = Some(max_elapsed);
        self
    }

    pub fn monitoring_config(mut self, monitoring: MonitoringConfig) -> Self {
        self.config.monitoring = monitoring;
        self
    }

    pub fn correlation_ids(mut self, enabled: bool) -> Self {
        self.config.monitoring.correlation_ids = enabled;
        self
    }

    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.config.monitoring.request_logging = enabled;
        self
    }

    pub fn performance_metrics(mut self, enabled: bool) -> Self {
        self.config.monitoring.performance_metrics = enabled;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.monitoring.log_level = level;
        self
    }

    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}
