//! Response translation
//!
//! Turns a settled HTTP response into an `ApiResult`: success bodies become a
//! `ValidResult` whose items are wrapped in a lazy pager, failure bodies become
//! an `ErrorResult` with the array's error entries.

use super::pager::ItemPager;
use super::result::{ErrorEntry, ErrorResult, ValidResult};
use crate::api::client::ClientCore;
use crate::api::groups::Endpoint;
use crate::api::params::CallArguments;
use crate::api::transport::{ApiException, RawResponse};
use log::warn;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Envelope shared by every list response of the API
#[derive(Debug, Default)]
pub struct PageBody {
    pub continuation_token: Option<String>,
    pub total_item_count: Option<u64>,
    pub more_items_remaining: Option<bool>,
    pub items: Option<Vec<Value>>,
    pub total: Option<Vec<Value>>,
    pub errors: Option<Vec<ErrorEntry>>,
}

/// Parsed success body plus the raw text when it was not usable as JSON
#[derive(Debug, Default)]
pub struct ParsedPage {
    pub body: PageBody,
    pub raw_body: Option<String>,
}

/// Parse a success body; `raw` keeps the text untouched.
pub fn parse_page(body: &str, raw: bool) -> ParsedPage {
    if raw {
        return ParsedPage {
            body: PageBody::default(),
            raw_body: Some(body.to_string()),
        };
    }

    if body.trim().is_empty() {
        return ParsedPage::default();
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut envelope)) => ParsedPage {
            body: PageBody::from_envelope(&mut envelope),
            raw_body: None,
        },
        Ok(_) => {
            warn!("Success response body is JSON but not a page envelope");
            ParsedPage {
                body: PageBody::default(),
                raw_body: Some(body.to_string()),
            }
        }
        Err(e) => {
            warn!("Success response body is not JSON: {}", e);
            ParsedPage {
                body: PageBody::default(),
                raw_body: Some(body.to_string()),
            }
        }
    }
}

impl PageBody {
    /// Read each envelope field on its own; a mistyped field is dropped with a
    /// warning and never takes the rest of the page with it.
    fn from_envelope(envelope: &mut Map<String, Value>) -> Self {
        Self {
            continuation_token: take_field(envelope, "continuation_token", |v| match v {
                Value::String(token) => Some(token),
                _ => None,
            }),
            total_item_count: take_field(envelope, "total_item_count", |v| v.as_u64()),
            more_items_remaining: take_field(envelope, "more_items_remaining", |v| v.as_bool()),
            items: take_field(envelope, "items", array),
            total: take_field(envelope, "total", array),
            errors: envelope
                .get("errors")
                .filter(|v| !v.is_null())
                .map(error_entries),
        }
    }
}

fn array(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(values) => Some(values),
        _ => None,
    }
}

fn take_field<T>(envelope: &mut Map<String, Value>, key: &str, read: impl FnOnce(Value) -> Option<T>) -> Option<T> {
    let value = envelope.remove(key).filter(|v| !v.is_null())?;
    let shown = value.to_string();
    let parsed = read(value);
    if parsed.is_none() {
        warn!("Ignoring page field '{}' with unexpected value {}", key, shown);
    }
    parsed
}

/// Error entries of an `errors` list, skipping entries that are not objects
fn error_entries(list: &Value) -> Vec<ErrorEntry> {
    let Some(entries) = list.as_array() else {
        warn!("Error list in response body is not an array: {}", list);
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(message) => Some(ErrorEntry::message_only(message.as_str())),
            Value::Object(_) => match serde_json::from_value::<ErrorEntry>(entry.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping unreadable error entry {}: {}", entry, e);
                    None
                }
            },
            other => {
                warn!("Skipping unreadable error entry {}", other);
                None
            }
        })
        .collect()
}

/// Build the `ValidResult` of a call, binding its items to a pager that can
/// fetch the following pages with the same arguments.
pub(crate) fn translate_success(
    core: &Arc<ClientCore>,
    endpoint: Endpoint,
    args: CallArguments,
    response: RawResponse,
) -> ValidResult {
    let ParsedPage { body, raw_body } = parse_page(&response.body, args.options.raw_content);

    let items = body.items.map(|items| {
        ItemPager::new(
            core.clone(),
            endpoint,
            args,
            items,
            body.continuation_token.clone(),
            body.more_items_remaining,
        )
    });

    ValidResult {
        status_code: response.status,
        continuation_token: body.continuation_token,
        total_item_count: body.total_item_count,
        items,
        headers: response.headers,
        total: body.total,
        more_items_remaining: body.more_items_remaining,
        errors: body.errors,
        raw_body,
    }
}

/// Build the `ErrorResult` of a failed call. Status and headers always survive,
/// even when the body is unreadable.
pub fn translate_error(exception: ApiException) -> ErrorResult {
    let errors = match serde_json::from_str::<Value>(&exception.body) {
        Ok(json) => {
            let entries = match exception.status {
                // Gateway-level rejections carry a single top-level message
                403 | 429 => top_level_message(&json).or_else(|| error_list(&json)),
                _ => error_list(&json).or_else(|| top_level_message(&json)),
            };
            entries.unwrap_or_else(|| vec![unreadable(exception.status, "no error details in body")])
        }
        Err(e) => vec![unreadable(exception.status, &e.to_string())],
    };

    ErrorResult {
        status_code: exception.status,
        errors,
        headers: exception.headers,
    }
}

fn top_level_message(json: &Value) -> Option<Vec<ErrorEntry>> {
    json.get("message")
        .and_then(Value::as_str)
        .map(|message| vec![ErrorEntry::message_only(message)])
}

fn error_list(json: &Value) -> Option<Vec<ErrorEntry>> {
    let entries = error_entries(json.get("errors")?);
    (!entries.is_empty()).then_some(entries)
}

fn unreadable(status: u16, detail: &str) -> ErrorEntry {
    ErrorEntry::message_only(format!("Unable to parse error response for HTTP {}: {}", status, detail))
}
