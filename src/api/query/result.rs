//! Call results
//!
//! A call either settles as a `ValidResult` (possibly carrying a lazily paged
//! item sequence) or as an `ErrorResult` with the array's structured errors.

use super::pager::ItemPager;
use crate::api::constants::headers;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One structured error reported by the array
///
/// Fields are read leniently: a non-string value is kept as its `name`
/// member when it has one, otherwise as its JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "lenient_message")]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location_context: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Object(ref map) => match map.get("name").and_then(Value::as_str) {
            Some(name) => Some(name.to_string()),
            None => Some(value.to_string()),
        },
        other => Some(other.to_string()),
    })
}

fn lenient_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

impl ErrorEntry {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            context: None,
            message: message.into(),
            location_context: None,
        }
    }
}

impl std::fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.context {
            Some(context) => write!(f, "{}: {}", context, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Failed outcome of a call
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResult {
    pub status_code: u16,
    pub errors: Vec<ErrorEntry>,
    pub headers: HeaderMap,
}

impl ErrorResult {
    pub fn response_headers(&self) -> ResponseHeaders {
        ResponseHeaders::from_map(&self.headers)
    }

    /// First error message, handy for one-line reporting
    pub fn message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }
}

/// Successful outcome of a call
#[derive(Debug)]
pub struct ValidResult {
    pub status_code: u16,
    pub continuation_token: Option<String>,
    pub total_item_count: Option<u64>,
    /// Lazily paged items; `None` when the response carried no item list
    pub items: Option<ItemPager>,
    pub headers: HeaderMap,
    /// Aggregate totals, when requested with `total_item_count`/`total_only`
    pub total: Option<Vec<Value>>,
    pub more_items_remaining: Option<bool>,
    /// Per-item failures returned alongside successful items
    pub errors: Option<Vec<ErrorEntry>>,
    /// Unparsed body, set for raw-content calls or bodies that were not JSON
    pub raw_body: Option<String>,
}

impl ValidResult {
    pub fn response_headers(&self) -> ResponseHeaders {
        ResponseHeaders::from_map(&self.headers)
    }

    pub fn into_items(self) -> Option<ItemPager> {
        self.items
    }

    pub fn has_partial_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }
}

/// Either outcome of a call
#[derive(Debug)]
pub enum ApiResult {
    Valid(ValidResult),
    Error(ErrorResult),
}

impl ApiResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ApiResult::Valid(_))
    }

    pub fn is_error(&self) -> bool {
        !self.is_valid()
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiResult::Valid(valid) => valid.status_code,
            ApiResult::Error(error) => error.status_code,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        match self {
            ApiResult::Valid(valid) => &valid.headers,
            ApiResult::Error(error) => &error.headers,
        }
    }

    pub fn valid(self) -> Option<ValidResult> {
        match self {
            ApiResult::Valid(valid) => Some(valid),
            ApiResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorResult> {
        match self {
            ApiResult::Valid(_) => None,
            ApiResult::Error(error) => Some(error),
        }
    }

    /// Convert into a `Result`, e.g. to use `?` on the error side
    pub fn into_result(self) -> Result<ValidResult, ErrorResult> {
        match self {
            ApiResult::Valid(valid) => Ok(valid),
            ApiResult::Error(error) => Err(error),
        }
    }
}

/// Typed view of the request-id and rate-limit response headers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub x_request_id: Option<String>,
    pub x_ratelimit_sec: Option<u32>,
    pub x_ratelimit_min: Option<u32>,
    pub x_ratelimit_remaining_sec: Option<u32>,
    pub x_ratelimit_remaining_min: Option<u32>,
}

impl ResponseHeaders {
    pub fn from_map(map: &HeaderMap) -> Self {
        let text = |name: &str| map.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        let number = |name: &str| text(name).and_then(|v| v.trim().parse().ok());

        Self {
            x_request_id: text(headers::X_REQUEST_ID),
            x_ratelimit_sec: number(headers::X_RATELIMIT_SEC),
            x_ratelimit_min: number(headers::X_RATELIMIT_MIN),
            x_ratelimit_remaining_sec: number(headers::X_RATELIMIT_REMAINING_SEC),
            x_ratelimit_remaining_min: number(headers::X_RATELIMIT_REMAINING_MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_entry_accepts_structured_fields() {
        let entry: ErrorEntry = serde_json::from_value(json!({
            "context": null,
            "message": "Volume does not exist.",
            "location_context": {"name": "array1", "id": "a-1"}
        }))
        .unwrap();
        assert_eq!(entry.context, None);
        assert_eq!(entry.location_context.as_deref(), Some("array1"));

        let entry: ErrorEntry = serde_json::from_value(json!({
            "message": 42,
            "location_context": {"id": "a-1"}
        }))
        .unwrap();
        assert_eq!(entry.message, "42");
        assert_eq!(entry.location_context.as_deref(), Some(r#"{"id":"a-1"}"#));
    }

    #[test]
    fn test_response_headers_parsing() {
        let mut map = HeaderMap::new();
        map.insert("x-request-id", "req-42".parse().unwrap());
        map.insert("X-RateLimit-Limit-minute", "1000".parse().unwrap());
        map.insert("X-RateLimit-Remaining-minute", "998".parse().unwrap());
        map.insert("X-RateLimit-Limit-second", "not-a-number".parse().unwrap());

        let parsed = ResponseHeaders::from_map(&map);

        assert_eq!(parsed.x_request_id.as_deref(), Some("req-42"));
        assert_eq!(parsed.x_ratelimit_min, Some(1000));
        assert_eq!(parsed.x_ratelimit_remaining_min, Some(998));
        assert_eq!(parsed.x_ratelimit_sec, None);
        assert_eq!(parsed.x_ratelimit_remaining_sec, None);
    }

    #[test]
    fn test_api_result_accessors() {
        let error = ErrorResult {
            status_code: 404,
            errors: vec![ErrorEntry {
                context: Some("vol1".to_string()),
                message: "Volume does not exist.".to_string(),
                location_context: None,
            }],
            headers: HeaderMap::new(),
        };
        let result = ApiResult::Error(error.clone());

        assert!(result.is_error());
        assert_eq!(result.status_code(), 404);
        assert_eq!(result.error().and_then(|e| e.message()), Some("Volume does not exist."));
        assert_eq!(error.errors[0].to_string(), "vol1: Volume does not exist.");
        assert_eq!(result.into_result().unwrap_err(), error);
    }
}
