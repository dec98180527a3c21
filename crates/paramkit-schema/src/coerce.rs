//! # Coercion Engine
//!
//! Applies a schema to raw input. Every declared attribute is coerced from
//! the raw value under its name, in declaration order. Missing keys and
//! explicit nulls read the same; unknown keys are ignored; input that is not
//! a mapping reads as an empty mapping. Construction never fails.

use std::sync::Arc;

use paramkit_core::Value;

use crate::instance::Instance;
use crate::schema::Schema;
use crate::scope::Scope;

static NULL: Value = Value::Null;

/// Build an instance of `schema` from `raw`.
pub fn build(schema: &Arc<Schema>, raw: Option<&Value>) -> Instance {
    build_scoped(schema, raw, None)
}

/// Build an instance whose whole tree shares `scope`.
pub fn build_scoped(
    schema: &Arc<Schema>,
    raw: Option<&Value>,
    scope: Option<Arc<dyn Scope>>,
) -> Instance {
    let input = raw.and_then(Value::as_map);
    let values = schema
        .attributes()
        .iter()
        .map(|attr| {
            let raw = input
                .and_then(|m| m.get(&attr.name))
                .unwrap_or(&NULL);
            (attr.name.clone(), attr.descriptor.coerce_in(raw, scope.as_ref()))
        })
        .collect();
    Instance::new(Arc::clone(schema), values, scope)
}
