//! Structured logging with request-id correlation
//!
//! Every event is a JSON document emitted through the `log` facade, keyed by
//! the call's `X-Request-ID` so client logs line up with array audit logs.
//! An optional [`EventSink`] receives the same documents.

use super::config::{LogLevel, MonitoringConfig};
use reqwest::header::HeaderMap;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use log::{debug, error, info, warn};

/// Receiver for structured events alongside the `log` output
pub trait EventSink: Send + Sync {
    fn record(&self, event: &Value);
}

/// Structured logger for API calls
#[derive(Clone)]
pub struct ApiLogger {
    config: MonitoringConfig,
    sink: Option<Arc<dyn EventSink>>,
}

/// Context of one logical API call
#[derive(Debug, Clone)]
pub struct OperationContext {
    /// Request id shared by every attempt and page of the call
    pub correlation_id: String,
    /// Operation name, e.g. `get` or `post volumes`
    pub operation_type: String,
    pub resource_group: String,
    pub start_time: Instant,
}

/// Outcome metrics of one logical API call
#[derive(Debug, Clone)]
pub struct OperationMetrics {
    pub duration: Duration,
    pub retry_attempts: u32,
    pub success: bool,
    pub status_code: Option<u16>,
    pub error_message: Option<String>,
    /// Every rate-limit wait taken, in order
    pub rate_limit_delays: Vec<Duration>,
}

impl ApiLogger {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config, sink: None }
    }

    /// Logger that also forwards every emitted event to `sink`
    pub fn with_sink(config: MonitoringConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config,
            sink: Some(sink),
        }
    }

    pub fn start_operation(&self, operation_type: &str, resource_group: &str, correlation_id: &str) -> OperationContext {
        let context = OperationContext {
            correlation_id: correlation_id.to_string(),
            operation_type: operation_type.to_string(),
            resource_group: resource_group.to_string(),
            start_time: Instant::now(),
        };

        if self.config.request_logging && self.should_log(&LogLevel::Info) {
            let log_data = self.event("operation_started", &context, json!({}));
            info!("API Operation Started: {}", log_data);
        }

        context
    }

    pub fn log_request(&self, context: &OperationContext, method: &str, url: &str, query: &[(String, String)]) {
        if !self.config.request_logging || !self.should_log(&LogLevel::Debug) {
            return;
        }

        let log_data = self.event(
            "http_request",
            context,
            json!({
                "method": method,
                "url": url,
                "query": query.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>(),
            }),
        );

        debug!("HTTP Request: {}", log_data);
    }

    pub fn log_response(&self, context: &OperationContext, status_code: u16, headers: &HeaderMap, duration: Duration) {
        if !self.config.request_logging || !self.should_log(&LogLevel::Debug) {
            return;
        }

        let log_data = self.event(
            "http_response",
            context,
            json!({
                "status_code": status_code,
                "duration_ms": duration.as_millis(),
                "headers": self.sanitize_headers(headers),
            }),
        );

        if status_code >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            debug!("HTTP Response: {}", log_data);
        }
    }

    pub fn log_retry(&self, context: &OperationContext, attempt: u32, reason: &str, delay: Duration) {
        if !self.should_log(&LogLevel::Warn) {
            return;
        }

        let log_data = self.event(
            "retry_attempt",
            context,
            json!({
                "attempt": attempt,
                "reason": reason,
                "delay_ms": delay.as_millis(),
            }),
        );

        warn!("Retry Attempt: {}", log_data);
    }

    pub fn log_rate_limit(&self, context: &OperationContext, delay: Duration) {
        if !self.should_log(&LogLevel::Info) {
            return;
        }

        let log_data = self.event("rate_limited", context, json!({ "delay_ms": delay.as_millis() }));
        info!("Rate Limited: {}", log_data);
    }

    /// Compatibility warning for a scalar wrapped into a list parameter
    pub fn log_coercion(&self, context: &OperationContext, parameter: &str, message: &str) {
        if !self.should_log(&LogLevel::Warn) {
            return;
        }

        let log_data = self.event(
            "compat_coercion",
            context,
            json!({ "parameter": parameter, "message": message }),
        );

        warn!("Parameter Coerced: {}", log_data);
    }

    pub fn log_page_fetch(&self, context: &OperationContext, page: u32, continuation_token: &str) {
        if !self.should_log(&LogLevel::Debug) {
            return;
        }

        let log_data = self.event(
            "page_fetch",
            context,
            json!({ "page": page, "continuation_token": continuation_token }),
        );

        debug!("Fetching Page: {}", log_data);
    }

    pub fn complete_operation(&self, context: &OperationContext, metrics: &OperationMetrics) {
        if !self.config.performance_metrics || !self.should_log(&LogLevel::Info) {
            return;
        }

        let log_data = self.event(
            "operation_completed",
            context,
            json!({
                "duration_ms": metrics.duration.as_millis(),
                "retry_attempts": metrics.retry_attempts,
                "success": metrics.success,
                "status_code": metrics.status_code,
                "error_message": metrics.error_message,
                "rate_limit_delays_ms": metrics.rate_limit_delays.iter().map(|d| d.as_millis()).collect::<Vec<_>>(),
            }),
        );

        if metrics.success {
            info!("API Operation Completed: {}", log_data);
        } else {
            error!("API Operation Failed: {}", log_data);
        }
    }

    fn event(&self, name: &str, context: &OperationContext, fields: Value) -> Value {
        let mut log_data = json!({
            "event": name,
            "operation_type": context.operation_type,
            "resource_group": context.resource_group,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        if self.config.correlation_ids {
            log_data["correlation_id"] = json!(context.correlation_id);
        }
        if let (Value::Object(target), Value::Object(extra)) = (&mut log_data, fields) {
            target.extend(extra);
        }

        if let Some(sink) = &self.sink {
            sink.record(&log_data);
        }
        log_data
    }

    fn should_log(&self, level: &LogLevel) -> bool {
        *level <= self.config.log_level
    }

    /// Redact credentials before headers hit the log
    fn sanitize_headers(&self, headers: &HeaderMap) -> Map<String, Value> {
        let mut sanitized = Map::new();

        for (name, value) in headers {
            let key = name.as_str();
            let shown = if key.contains("authorization") || key.contains("token") || key.contains("key") {
                "[REDACTED]".to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            sanitized.insert(key.to_string(), Value::String(shown));
        }

        sanitized
    }
}

impl std::fmt::Debug for ApiLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiLogger")
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl OperationContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn create_metrics(&self, success: bool, status_code: Option<u16>, error_message: Option<String>) -> OperationMetrics {
        OperationMetrics {
            duration: self.elapsed(),
            retry_attempts: 0,
            success,
            status_code,
            error_message,
            rate_limit_delays: Vec::new(),
        }
    }
}

impl OperationMetrics {
    pub fn add_retry(&mut self) {
        self.retry_attempts += 1;
    }

    pub fn add_rate_limit_delay(&mut self, delay: Duration) {
        self.rate_limit_delays.push(delay);
    }

    pub fn total_rate_limit_delay(&self) -> Duration {
        self.rate_limit_delays.iter().sum()
    }

    /// Close the metrics once the call has settled
    pub fn finish(&mut self, context: &OperationContext, success: bool, error_message: Option<String>) {
        self.duration = context.elapsed();
        self.success = success;
        self.error_message = error_message;
    }
}
