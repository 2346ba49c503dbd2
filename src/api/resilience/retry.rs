//! Retry and failure policy
//!
//! Classifies failed HTTP attempts by status and decides whether to give up,
//! refresh credentials, wait out a rate limit or simply try again.

use super::logging::{ApiLogger, OperationContext, OperationMetrics};
use crate::api::constants::{self, headers};
use crate::api::transport::{ApiException, InvokeError, RawResponse};
use crate::error::ClientError;
use log::{debug, warn};
use reqwest::header::HeaderMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt; `None` means unlimited
    pub max_retries: Option<u32>,
    /// Wait when the per-minute bucket is exhausted
    pub minute_bucket_wait: Duration,
    /// Wait applied after every 429
    pub second_bucket_wait: Duration,
    /// Wall-clock bound for the whole retry loop of one call
    pub max_elapsed: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            minute_bucket_wait: constants::MINUTE_BUCKET_WAIT,
            second_bucket_wait: constants::SECOND_BUCKET_WAIT,
            max_elapsed: None,
        }
    }
}

impl RetryConfig {
    /// Few retries and a bounded wall clock, for production scripts
    pub fn conservative() -> Self {
        Self {
            max_retries: Some(2),
            max_elapsed: Some(Duration::from_secs(300)),
            ..Self::default()
        }
    }

    /// Many retries, for flaky lab arrays
    pub fn aggressive() -> Self {
        Self {
            max_retries: Some(10),
            ..Self::default()
        }
    }

    /// Single attempt, no retries
    pub fn disabled() -> Self {
        Self {
            max_retries: Some(0),
            ..Self::default()
        }
    }
}

/// How a failed status is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 400, 404 and 500: deterministic, returned immediately
    Fatal,
    /// 401 and 403: refresh the credential and retry
    Auth,
    /// 429: wait out the rate-limit window and retry
    RateLimited,
    /// Anything above 500: retry straight away
    Transient,
    /// Outside the table: raised as an error
    Unclassified,
}

impl FailureClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 404 | 500 => FailureClass::Fatal,
            401 | 403 => FailureClass::Auth,
            429 => FailureClass::RateLimited,
            s if s > 500 => FailureClass::Transient,
            _ => FailureClass::Unclassified,
        }
    }

    pub fn should_retry(&self) -> bool {
        matches!(
            self,
            FailureClass::Auth | FailureClass::RateLimited | FailureClass::Transient
        )
    }
}

/// Terminal state of the retry loop
#[derive(Debug)]
pub enum Completion {
    Success(RawResponse),
    Failed(ApiException),
}

/// Bounded retry loop around a single-attempt invoker
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Drive `attempt` until success, a fatal status or an exhausted budget.
    ///
    /// `refresh` is awaited before retrying an authentication failure.
    /// Local failures (no HTTP status) and unclassified statuses are raised.
    pub async fn execute<A, AFut, R, RFut>(
        &self,
        mut attempt: A,
        mut refresh: R,
        logger: &ApiLogger,
        context: &OperationContext,
        metrics: &mut OperationMetrics,
    ) -> Result<Completion, ClientError>
    where
        A: FnMut() -> AFut,
        AFut: Future<Output = Result<RawResponse, InvokeError>>,
        R: FnMut() -> RFut,
        RFut: Future<Output = Result<(), ClientError>>,
    {
        let started = Instant::now();
        let mut retries_used: u32 = 0;

        loop {
            let exception = match attempt().await {
                Ok(response) => {
                    metrics.status_code = Some(response.status);
                    return Ok(Completion::Success(response));
                }
                Err(InvokeError::Local(error)) => return Err(error),
                Err(InvokeError::Status(exception)) => exception,
            };

            metrics.status_code = Some(exception.status);
            let class = FailureClass::from_status(exception.status);

            match class {
                FailureClass::Fatal => {
                    debug!("HTTP {} is not retryable", exception.status);
                    return Ok(Completion::Failed(exception));
                }
                FailureClass::Unclassified => {
                    return Err(ClientError::UnclassifiedStatus {
                        status: exception.status,
                        body: exception.body,
                    });
                }
                _ => {}
            }

            if let Some(max) = self.config.max_retries {
                if retries_used >= max {
                    warn!("Retry budget of {} exhausted, giving up on HTTP {}", max, exception.status);
                    return Ok(Completion::Failed(exception));
                }
            }

            let waits = match class {
                FailureClass::RateLimited => self.rate_limit_waits(&exception.headers),
                _ => Vec::new(),
            };

            if let Some(max_elapsed) = self.config.max_elapsed {
                let planned: Duration = waits.iter().sum();
                if started.elapsed() + planned >= max_elapsed {
                    warn!("Retry deadline of {:?} reached, giving up on HTTP {}", max_elapsed, exception.status);
                    return Ok(Completion::Failed(exception));
                }
            }

            retries_used = retries_used.saturating_add(1);
            metrics.add_retry();
            logger.log_retry(
                context,
                retries_used,
                &format!("HTTP {} ({:?})", exception.status, class),
                waits.iter().sum(),
            );

            match class {
                FailureClass::Auth => refresh().await?,
                FailureClass::RateLimited => {
                    for wait in waits {
                        logger.log_rate_limit(context, wait);
                        metrics.add_rate_limit_delay(wait);
                        tokio::time::sleep(wait).await;
                    }
                }
                _ => {}
            }
        }
    }

    /// Waits for a 429: the minute window when that bucket is the exhausted one,
    /// then always the second window.
    pub fn rate_limit_waits(&self, response_headers: &HeaderMap) -> Vec<Duration> {
        let header = |name: &str| response_headers.get(name).and_then(|v| v.to_str().ok());

        let minute_exhausted = match (
            header(headers::X_RATELIMIT_REMAINING_MIN),
            header(headers::X_RATELIMIT_MIN),
        ) {
            (Some(remaining), Some(limit)) => remaining.trim() == limit.trim(),
            _ => false,
        };

        let mut waits = Vec::with_capacity(2);
        if minute_exhausted {
            waits.push(self.config.minute_bucket_wait);
        }
        waits.push(self.config.second_bucket_wait);
        waits
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
