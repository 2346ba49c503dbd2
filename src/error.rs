//! Error types for the FlashArray client
//!
//! Only the failures a caller cannot get back as a structured
//! [`ErrorResult`](crate::api::ErrorResult) live here: local validation
//! problems, statuses the retry policy does not know how to classify,
//! credential refresh failures and connection-level transport errors.

use crate::api::query::ErrorResult;
use thiserror::Error;

/// Errors raised by the client instead of being returned as an `ErrorResult`
#[derive(Error, Debug)]
pub enum ClientError {
    /// Caller input rejected before any network I/O
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// HTTP status outside the retry classification table
    #[error("Unclassified HTTP status {status}: {body}")]
    UnclassifiedStatus { status: u16, body: String },

    /// The token manager could not produce or refresh a credential
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Connection-level failure with no HTTP status (DNS, TLS, timeout, ...)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// A follow-up page fetch ended in a fatal API error
    #[error("Pagination stopped with HTTP {}", .0.status_code)]
    Pagination(Box<ErrorResult>),

    /// Client construction or configuration problems
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::Authentication {
            message: message.into(),
            source,
        }
    }

    pub fn transport(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::Transport {
            message: message.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::Configuration {
            message: message.into(),
            source,
        }
    }

    /// Whether the failure happened locally, before any request was sent
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
