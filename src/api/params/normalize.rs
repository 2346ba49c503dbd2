//! Multi-valued parameter normalization

use super::args::{CallArguments, ParamValue};
use crate::api::constants::params;

/// A scalar that was wrapped into a one-element list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coercion {
    pub parameter: String,
    pub value: String,
}

impl Coercion {
    pub fn message(&self) -> String {
        format!(
            "parameter '{}' expects a list; scalar '{}' was wrapped as ['{}']",
            self.parameter, self.value, self.value
        )
    }
}

/// Wrap scalars given to list parameters into single-element lists.
///
/// Returns one `Coercion` per rewritten parameter; absent and list-valued
/// parameters are left alone.
pub fn normalize_multi_valued(args: &mut CallArguments) -> Vec<Coercion> {
    let mut coercions = Vec::new();

    for (name, slot) in [
        (params::IDS, &mut args.ids),
        (params::NAMES, &mut args.names),
        (params::SORT, &mut args.sort),
    ] {
        if let Some(value) = slot {
            coercions.extend(coerce(name, value));
        }
    }

    for (name, value) in args.extra.iter_mut() {
        if params::MULTI_VALUED.contains(&name.as_str()) {
            coercions.extend(coerce(name, value));
        }
    }

    coercions
}

fn coerce(name: &str, value: &mut ParamValue) -> Option<Coercion> {
    let ParamValue::Scalar(scalar) = value else {
        return None;
    };

    let scalar = std::mem::take(scalar);
    *value = ParamValue::List(vec![scalar.clone()]);

    Some(Coercion {
        parameter: name.to_string(),
        value: scalar,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_is_wrapped_with_one_warning() {
        let mut args = CallArguments::new().names("vol1");

        let coercions = normalize_multi_valued(&mut args);

        assert_eq!(args.names, Some(ParamValue::List(vec!["vol1".to_string()])));
        assert_eq!(coercions.len(), 1);
        assert_eq!(coercions[0].parameter, "names");
        assert_eq!(coercions[0].value, "vol1");
        assert!(coercions[0].message().contains("names"));
    }

    #[test]
    fn test_lists_and_absent_are_untouched() {
        let mut args = CallArguments::new().ids(vec!["1", "2"]).filter("name='x'");

        let coercions = normalize_multi_valued(&mut args);

        assert!(coercions.is_empty());
        assert_eq!(args.ids, Some(ParamValue::from(vec!["1", "2"])));
        assert!(args.names.is_none());
        assert!(args.sort.is_none());
    }

    #[test]
    fn test_extra_multi_valued_params() {
        let mut args = CallArguments::new()
            .with_param("member_names", "host1")
            .with_param("destroyed_only", "true");

        let coercions = normalize_multi_valued(&mut args);

        assert_eq!(coercions.len(), 1);
        assert_eq!(args.extra["member_names"], ParamValue::from(vec!["host1"]));
        assert_eq!(args.extra["destroyed_only"], ParamValue::from("true"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut args = CallArguments::new().sort("name").ids("1");

        assert_eq!(normalize_multi_valued(&mut args).len(), 2);
        let once = args.to_query_pairs();

        assert!(normalize_multi_valued(&mut args).is_empty());
        assert_eq!(args.to_query_pairs(), once);
    }
}
