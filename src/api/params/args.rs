//! Per-call request arguments
//!
//! `CallArguments` is the explicit parameter record every endpoint accepts.
//! The common list/filter/pagination parameters are typed fields; anything
//! endpoint-specific goes through `extra`.

use super::references::Reference;
use crate::api::constants::params;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// A query parameter value, either a single scalar or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Scalar(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Wire form: lists are sent comma-separated
    pub fn to_query_string(&self) -> String {
        match self {
            ParamValue::Scalar(value) => value.clone(),
            ParamValue::List(values) => values.join(","),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Scalar(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::List(values)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        ParamValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ParamValue {
    fn from(values: &[&str]) -> Self {
        ParamValue::List(values.iter().map(|v| v.to_string()).collect())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Scalar(value.to_string())
    }
}

/// Which reference-style convenience parameter a set of references fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceRole {
    /// The objects the endpoint operates on (`ids` / `names`)
    Primary,
    /// Members of a group (`member_ids` / `member_names`)
    Members,
    /// Groups owning members (`group_ids` / `group_names`)
    Groups,
    /// Sources of a copy or snapshot (`source_ids` / `source_names`)
    Sources,
}

/// Execution options that never reach the wire as query parameters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallOptions {
    /// Overrides the client-wide request timeout for every attempt of this call
    pub timeout: Option<Duration>,
    /// Skip body parsing and hand back the raw response text
    pub raw_content: bool,
}

/// Arguments for one logical API call
#[derive(Debug, Clone, Default)]
pub struct CallArguments {
    pub ids: Option<ParamValue>,
    pub names: Option<ParamValue>,
    pub sort: Option<ParamValue>,
    pub filter: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub continuation_token: Option<String>,
    pub total_item_count: Option<bool>,
    pub total_only: Option<bool>,
    pub destroyed: Option<bool>,
    /// Sent as `X-Request-ID`; generated when missing or empty
    pub request_id: Option<String>,
    /// Endpoint-specific query parameters
    pub extra: BTreeMap<String, ParamValue>,
    /// JSON request body for POST/PATCH endpoints
    pub body: Option<Value>,
    /// Reference convenience parameters, consumed during preparation
    pub references: BTreeMap<ReferenceRole, Vec<Reference>>,
    pub options: CallOptions,
}

impl CallArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(mut self, ids: impl Into<ParamValue>) -> Self {
        self.ids = Some(ids.into());
        self
    }

    pub fn names(mut self, names: impl Into<ParamValue>) -> Self {
        self.names = Some(names.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<ParamValue>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn continuation_token(mut self, token: impl Into<String>) -> Self {
        self.continuation_token = Some(token.into());
        self
    }

    pub fn total_item_count(mut self, enabled: bool) -> Self {
        self.total_item_count = Some(enabled);
        self
    }

    pub fn total_only(mut self, enabled: bool) -> Self {
        self.total_only = Some(enabled);
        self
    }

    pub fn destroyed(mut self, destroyed: bool) -> Self {
        self.destroyed = Some(destroyed);
        self
    }

    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Set an endpoint-specific query parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set_param(&key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// References to the objects the endpoint operates on
    pub fn references(self, references: impl IntoIterator<Item = Reference>) -> Self {
        self.references_for(ReferenceRole::Primary, references)
    }

    pub fn member_references(self, references: impl IntoIterator<Item = Reference>) -> Self {
        self.references_for(ReferenceRole::Members, references)
    }

    pub fn group_references(self, references: impl IntoIterator<Item = Reference>) -> Self {
        self.references_for(ReferenceRole::Groups, references)
    }

    pub fn source_references(self, references: impl IntoIterator<Item = Reference>) -> Self {
        self.references_for(ReferenceRole::Sources, references)
    }

    pub fn references_for(mut self, role: ReferenceRole, references: impl IntoIterator<Item = Reference>) -> Self {
        self.references.entry(role).or_default().extend(references);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn raw_content(mut self, raw: bool) -> Self {
        self.options.raw_content = raw;
        self
    }

    /// Look up a list-capable parameter by wire name
    pub fn get_param(&self, key: &str) -> Option<&ParamValue> {
        match key {
            params::IDS => self.ids.as_ref(),
            params::NAMES => self.names.as_ref(),
            params::SORT => self.sort.as_ref(),
            _ => self.extra.get(key),
        }
    }

    pub fn set_param(&mut self, key: &str, value: ParamValue) {
        match key {
            params::IDS => self.ids = Some(value),
            params::NAMES => self.names = Some(value),
            params::SORT => self.sort = Some(value),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    pub fn take_param(&mut self, key: &str) -> Option<ParamValue> {
        match key {
            params::IDS => self.ids.take(),
            params::NAMES => self.names.take(),
            params::SORT => self.sort.take(),
            _ => self.extra.remove(key),
        }
    }

    /// Query string pairs in a stable order
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                pairs.push((key.to_string(), value));
            }
        };

        push(params::IDS, self.ids.as_ref().map(ParamValue::to_query_string));
        push(params::NAMES, self.names.as_ref().map(ParamValue::to_query_string));
        push(params::FILTER, self.filter.clone());
        push(params::SORT, self.sort.as_ref().map(ParamValue::to_query_string));
        push(params::LIMIT, self.limit.map(|v| v.to_string()));
        push(params::OFFSET, self.offset.map(|v| v.to_string()));
        push(params::CONTINUATION_TOKEN, self.continuation_token.clone());
        push(params::TOTAL_ITEM_COUNT, self.total_item_count.map(|v| v.to_string()));
        push(params::TOTAL_ONLY, self.total_only.map(|v| v.to_string()));
        push(params::DESTROYED, self.destroyed.map(|v| v.to_string()));

        for (key, value) in &self.extra {
            pairs.push((key.clone(), value.to_query_string()));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_order_and_lists() {
        let args = CallArguments::new()
            .names(vec!["vol1", "vol2"])
            .filter("provisioned>1G")
            .limit(10)
            .total_item_count(true)
            .with_param("member_names", vec!["h1"]);

        let pairs = args.to_query_pairs();

        assert_eq!(pairs[0], ("names".to_string(), "vol1,vol2".to_string()));
        assert_eq!(pairs[1], ("filter".to_string(), "provisioned>1G".to_string()));
        assert_eq!(pairs[2], ("limit".to_string(), "10".to_string()));
        assert_eq!(pairs[3], ("total_item_count".to_string(), "true".to_string()));
        assert_eq!(pairs[4], ("member_names".to_string(), "h1".to_string()));
        assert_eq!(pairs.len(), 5);
    }

    #[test]
    fn test_param_routing() {
        let mut args = CallArguments::new().with_param("ids", vec!["a"]);
        assert_eq!(args.ids, Some(ParamValue::List(vec!["a".to_string()])));
        assert!(args.extra.is_empty());

        args.set_param("group_names", ParamValue::from("pg1"));
        assert_eq!(args.get_param("group_names"), Some(&ParamValue::from("pg1")));
        assert_eq!(args.take_param("group_names"), Some(ParamValue::from("pg1")));
        assert!(args.get_param("group_names").is_none());
    }

    #[test]
    fn test_builder_collects_references() {
        let args = CallArguments::new()
            .references(vec![Reference::by_name("vol1")])
            .references(vec![Reference::by_name("vol2")])
            .member_references(vec![Reference::by_id("h-1")])
            .body(json!({"provisioned": 1024}))
            .timeout(Duration::from_secs(5));

        assert_eq!(args.references[&ReferenceRole::Primary].len(), 2);
        assert_eq!(args.references[&ReferenceRole::Members].len(), 1);
        assert_eq!(args.options.timeout, Some(Duration::from_secs(5)));
        assert!(args.body.is_some());
    }
}
