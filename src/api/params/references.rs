//! Reference resolution
//!
//! Callers may select objects through `Reference` handles instead of raw
//! `ids`/`names` parameters. Resolution turns a homogeneous set of
//! references into exactly one list parameter on the call arguments.

use super::args::{CallArguments, ParamValue, ReferenceRole};
use crate::api::constants::params;
use crate::error::{ClientError, Result};
use serde_json::Value;

/// Handle selecting a remote object by one axis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    ById(String),
    ByName(String),
}

impl Reference {
    pub fn by_id(id: impl Into<String>) -> Self {
        Reference::ById(id.into())
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Reference::ByName(name.into())
    }

    /// Build a reference from an item returned by the array, preferring `id`
    pub fn from_item(item: &Value) -> Option<Self> {
        let non_empty = |key: &str| {
            item.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        non_empty("id")
            .map(Reference::ById)
            .or_else(|| non_empty("name").map(Reference::ByName))
    }

    fn id(&self) -> Option<&str> {
        match self {
            Reference::ById(id) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Reference::ByName(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

/// Candidate parameter names a reference binding can populate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTarget {
    pub ids: Option<&'static str>,
    pub names: Option<&'static str>,
}

impl ReferenceTarget {
    pub const PRIMARY: Self = Self {
        ids: Some(params::IDS),
        names: Some(params::NAMES),
    };
    pub const NAMES_ONLY: Self = Self {
        ids: None,
        names: Some(params::NAMES),
    };
    pub const MEMBERS: Self = Self {
        ids: Some(params::MEMBER_IDS),
        names: Some(params::MEMBER_NAMES),
    };
    pub const GROUPS: Self = Self {
        ids: Some(params::GROUP_IDS),
        names: Some(params::GROUP_NAMES),
    };
    pub const SOURCES: Self = Self {
        ids: Some(params::SOURCE_IDS),
        names: Some(params::SOURCE_NAMES),
    };
}

/// Replace the target's id/name parameters with the resolved references.
///
/// An empty reference slice leaves the arguments untouched. Fails without
/// mutating anything when the references are not all resolvable by the
/// same axis.
pub fn resolve_into(args: &mut CallArguments, references: &[Reference], target: ReferenceTarget) -> Result<()> {
    if references.is_empty() {
        return Ok(());
    }

    let ids: Option<Vec<String>> = references.iter().map(|r| r.id().map(str::to_string)).collect();
    let names: Option<Vec<String>> = references.iter().map(|r| r.name().map(str::to_string)).collect();

    let (key, values) = match (target.ids, ids, target.names, names) {
        (Some(key), Some(ids), _, _) => (key, ids),
        (_, _, Some(key), Some(names)) => (key, names),
        _ => {
            return Err(ClientError::validation(format!(
                "references must all carry a non-empty {}; got {:?}",
                describe(target),
                references
            )));
        }
    };

    for candidate in [target.ids, target.names].into_iter().flatten() {
        args.take_param(candidate);
    }
    args.set_param(key, ParamValue::List(values));

    Ok(())
}

/// Resolve every reference binding on the arguments against an endpoint's table
pub fn resolve_references(args: &mut CallArguments, accepted: &[(ReferenceRole, ReferenceTarget)]) -> Result<()> {
    let bindings = std::mem::take(&mut args.references);

    for (role, references) in bindings {
        let target = accepted
            .iter()
            .find(|(accepted_role, _)| *accepted_role == role)
            .map(|(_, target)| *target)
            .ok_or_else(|| ClientError::validation(format!("{:?} references are not accepted by this endpoint", role)))?;

        resolve_into(args, &references, target)?;
    }

    Ok(())
}

fn describe(target: ReferenceTarget) -> &'static str {
    match (target.ids, target.names) {
        (Some(_), Some(_)) => "id or a non-empty name",
        (Some(_), None) => "id",
        (None, Some(_)) => "name",
        (None, None) => "axis supported by the endpoint",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_ids_populate_id_parameter() {
        let mut args = CallArguments::new().ids("stale-id").names(vec!["stale-name"]);
        let refs = vec![Reference::by_id("1"), Reference::by_id("2")];

        resolve_into(&mut args, &refs, ReferenceTarget::PRIMARY).unwrap();

        assert_eq!(args.ids, Some(ParamValue::List(vec!["1".to_string(), "2".to_string()])));
        assert!(args.names.is_none());
    }

    #[test]
    fn test_all_names_populate_name_parameter() {
        let mut args = CallArguments::new().ids(vec!["stale"]);
        let refs = vec![Reference::by_name("vol1"), Reference::by_name("vol2")];

        resolve_into(&mut args, &refs, ReferenceTarget::PRIMARY).unwrap();

        assert!(args.ids.is_none());
        assert_eq!(args.names, Some(ParamValue::from(vec!["vol1", "vol2"])));
    }

    #[test]
    fn test_mixed_references_fail_without_mutation() {
        let mut args = CallArguments::new().names("keep");
        let refs = vec![Reference::by_id("1"), Reference::by_name("vol2")];

        let err = resolve_into(&mut args, &refs, ReferenceTarget::PRIMARY).unwrap_err();

        assert!(err.is_validation());
        assert_eq!(args.names, Some(ParamValue::from("keep")));
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        let mut args = CallArguments::new();
        let refs = vec![Reference::by_id("")];

        assert!(resolve_into(&mut args, &refs, ReferenceTarget::PRIMARY).is_err());
    }

    #[test]
    fn test_ids_rejected_when_endpoint_only_takes_names() {
        let mut args = CallArguments::new();
        let refs = vec![Reference::by_id("1")];

        assert!(resolve_into(&mut args, &refs, ReferenceTarget::NAMES_ONLY).is_err());
    }

    #[test]
    fn test_no_references_is_noop() {
        let mut args = CallArguments::new().names("vol1");

        resolve_into(&mut args, &[], ReferenceTarget::PRIMARY).unwrap();

        assert_eq!(args.names, Some(ParamValue::from("vol1")));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let refs = vec![Reference::by_name("pg1")];
        let mut args = CallArguments::new();

        resolve_into(&mut args, &refs, ReferenceTarget::GROUPS).unwrap();
        let once = args.to_query_pairs();
        resolve_into(&mut args, &refs, ReferenceTarget::GROUPS).unwrap();

        assert_eq!(args.to_query_pairs(), once);
        assert_eq!(args.get_param("group_names"), Some(&ParamValue::from(vec!["pg1"])));
    }

    #[test]
    fn test_resolve_references_rejects_unknown_role() {
        let mut args = CallArguments::new().member_references(vec![Reference::by_name("h1")]);

        let err = resolve_references(&mut args, &[(ReferenceRole::Primary, ReferenceTarget::PRIMARY)]).unwrap_err();

        assert!(err.is_validation());
    }

    #[test]
    fn test_resolve_references_consumes_bindings() {
        let mut args = CallArguments::new()
            .references(vec![Reference::by_name("pg1")])
            .member_references(vec![Reference::by_id("v-1")]);
        let table = [
            (ReferenceRole::Primary, ReferenceTarget::PRIMARY),
            (ReferenceRole::Members, ReferenceTarget::MEMBERS),
        ];

        resolve_references(&mut args, &table).unwrap();

        assert!(args.references.is_empty());
        assert_eq!(args.names, Some(ParamValue::from(vec!["pg1"])));
        assert_eq!(args.get_param("member_ids"), Some(&ParamValue::from(vec!["v-1"])));
    }

    #[test]
    fn test_reference_from_item() {
        assert_eq!(
            Reference::from_item(&json!({"id": "abc", "name": "vol1"})),
            Some(Reference::by_id("abc"))
        );
        assert_eq!(
            Reference::from_item(&json!({"id": "", "name": "vol1"})),
            Some(Reference::by_name("vol1"))
        );
        assert_eq!(Reference::from_item(&json!({"size": 1})), None);
    }
}
