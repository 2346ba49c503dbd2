//! Call argument preparation
//!
//! Pure transforms applied to a call's arguments before any request is sent:
//! reference resolution and multi-valued parameter normalization.

pub mod args;
pub mod normalize;
pub mod references;

pub use args::{CallArguments, CallOptions, ParamValue, ReferenceRole};
pub use normalize::{Coercion, normalize_multi_valued};
pub use references::{Reference, ReferenceTarget, resolve_into, resolve_references};
