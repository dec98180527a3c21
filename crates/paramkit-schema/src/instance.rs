//! # Instances
//!
//! An [`Instance`] is a schema applied to raw input: one [`AttributeValue`]
//! per declared attribute, in declaration order. Nested instances are owned by
//! the slot that holds them, so an instance is always a tree.
//!
//! Instances carry no error state. Validation is a pure function of the tree
//! (see [`crate::validation`]); [`Instance::errors`] is a shorthand for it.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use paramkit_core::{Map, Value};
use serde::{Serialize, Serializer};

use crate::rules::RuleEngine;
use crate::schema::Schema;
use crate::scope::Scope;
use crate::validation::{ValidationErrors, Validator};

/// The coerced value held by one attribute slot.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Scalar(Value),
    Collection(Collection),
    /// `None` when the nested object was absent and had no default.
    Struct(Option<Instance>),
    StructCollection(StructCollection),
}

impl AttributeValue {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            AttributeValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            AttributeValue::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            AttributeValue::Struct(inst) => inst.as_ref(),
            _ => None,
        }
    }

    pub fn as_struct_collection(&self) -> Option<&StructCollection> {
        match self {
            AttributeValue::StructCollection(c) => Some(c),
            _ => None,
        }
    }

    /// Plain projection: nested instances become mappings, collections
    /// become sequences, scalars stay as they are.
    pub fn to_plain(&self) -> Value {
        match self {
            AttributeValue::Scalar(v) => v.clone(),
            AttributeValue::Collection(c) => Value::List(c.to_vec()),
            AttributeValue::Struct(None) => Value::Null,
            AttributeValue::Struct(Some(inst)) => inst.to_plain(),
            AttributeValue::StructCollection(c) => {
                Value::List(c.iter().map(Instance::to_plain).collect())
            }
        }
    }
}

// ─── Collections ─────────────────────────────────────────────────────

/// An immutable sequence of coerced scalars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<Value>,
}

impl Collection {
    pub(crate) fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn get(&self, i: usize) -> Option<&Value> {
        self.items.get(i)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.items.clone()
    }
}

impl Index<usize> for Collection {
    type Output = Value;

    fn index(&self, i: usize) -> &Value {
        &self.items[i]
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// An immutable sequence of nested instances.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructCollection {
    items: Vec<Instance>,
}

impl StructCollection {
    pub(crate) fn new(items: Vec<Instance>) -> Self {
        Self { items }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.items.iter()
    }

    pub fn get(&self, i: usize) -> Option<&Instance> {
        self.items.get(i)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Index<usize> for StructCollection {
    type Output = Instance;

    fn index(&self, i: usize) -> &Instance {
        &self.items[i]
    }
}

impl<'a> IntoIterator for &'a StructCollection {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ─── Instance ────────────────────────────────────────────────────────

/// A schema materialized from raw input.
#[derive(Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    values: Vec<(String, AttributeValue)>,
    scope: Option<Arc<dyn Scope>>,
}

impl Instance {
    pub(crate) fn new(
        schema: Arc<Schema>,
        values: Vec<(String, AttributeValue)>,
        scope: Option<Arc<dyn Scope>>,
    ) -> Self {
        Self {
            schema,
            values,
            scope,
        }
    }

    /// The schema this instance was built from.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// The scope handed in at construction, shared by the whole tree.
    pub fn scope(&self) -> Option<&Arc<dyn Scope>> {
        self.scope.as_ref()
    }

    /// Attribute slots in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Scalar attribute value.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(AttributeValue::as_scalar)
    }

    /// Present nested instance.
    pub fn nested(&self, name: &str) -> Option<&Instance> {
        self.get(name).and_then(AttributeValue::as_instance)
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.get(name).and_then(AttributeValue::as_collection)
    }

    pub fn struct_collection(&self, name: &str) -> Option<&StructCollection> {
        self.get(name).and_then(AttributeValue::as_struct_collection)
    }

    /// Flat attribute map: each attribute's plain projection by name. Keys
    /// are sorted, like every [`Map`]; [`iter`](Self::iter) keeps declaration
    /// order.
    pub fn attributes(&self) -> Map {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_plain()))
            .collect()
    }

    /// Recursive plain projection as a [`Value::Map`].
    pub fn to_plain(&self) -> Value {
        Value::Map(self.attributes())
    }

    /// Plain projection rendered as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        self.to_plain().to_json()
    }

    /// Qualified validation errors for this instance and everything below it.
    pub fn errors<E: RuleEngine + ?Sized>(&self, engine: &E) -> ValidationErrors {
        Validator::new(engine).validate(self)
    }

    pub fn is_valid<E: RuleEngine + ?Sized>(&self, engine: &E) -> bool {
        self.errors(engine).is_empty()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Instance");
        if let Some(name) = self.schema.name() {
            s.field("schema", &name);
        }
        s.field("values", &self.values);
        if let Some(scope) = &self.scope {
            s.field("scope", scope);
        }
        s.finish()
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_plain().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{AttributeOptions, Definition, SchemaBuilder};
    use crate::coerce::build;
    use crate::registry::TypeRegistry;
    use serde_json::json;

    fn post_schema(registry: &TypeRegistry) -> Arc<Schema> {
        let mut b = SchemaBuilder::new(registry);
        b.integer("id", AttributeOptions::default())
            .unwrap()
            .collection_field("tags", "string", AttributeOptions::default())
            .unwrap()
            .struct_block("author", AttributeOptions::default(), |a| {
                a.string("name", AttributeOptions::default())?;
                Ok(())
            })
            .unwrap()
            .struct_collection_block("comments", AttributeOptions::default(), |c| {
                c.string("body", AttributeOptions::default())?;
                Ok(())
            })
            .unwrap();
        b.build()
    }

    #[test]
    fn test_projection_sorts_keys_iteration_keeps_declaration_order() {
        let registry = TypeRegistry::with_builtins();
        let schema = post_schema(&registry);
        let params = build(&schema, None);
        let declared: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(declared, ["id", "tags", "author", "comments"]);
        let keys: Vec<String> = params.attributes().into_keys().collect();
        assert_eq!(keys, ["author", "comments", "id", "tags"]);
        let text = serde_json::to_string(&params.to_json()).unwrap();
        assert!(text.starts_with(r#"{"author":"#));
    }

    #[test]
    fn test_to_plain_unwraps_nested_values() {
        let registry = TypeRegistry::with_builtins();
        let schema = post_schema(&registry);
        let raw = Value::from(json!({
            "id": "3",
            "tags": ["a", 1],
            "author": {"name": "Ann"},
            "comments": [{"body": "hi"}, {"body": 2}],
            "ignored": true
        }));
        let inst = build(&schema, Some(&raw));
        assert_eq!(
            inst.to_json(),
            json!({
                "id": 3,
                "tags": ["a", "1"],
                "author": {"name": "Ann"},
                "comments": [{"body": "hi"}, {"body": "2"}]
            })
        );
    }

    #[test]
    fn test_accessors() {
        let registry = TypeRegistry::with_builtins();
        let schema = post_schema(&registry);
        let inst = build(&schema, Some(&Value::from(json!({"comments": [{}]}))));
        assert_eq!(inst.value("id"), Some(&Value::Null));
        assert!(inst.nested("author").is_none());
        assert!(matches!(inst.get("author"), Some(AttributeValue::Struct(None))));
        assert_eq!(inst.collection("tags").map(Collection::len), Some(0));
        assert_eq!(inst.struct_collection("comments").map(StructCollection::len), Some(1));
        assert_eq!(inst.value("missing"), None);
        let names: Vec<&str> = inst.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["id", "tags", "author", "comments"]);
    }

    #[test]
    fn test_serialize_matches_projection() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        b.struct_field(
            "post",
            Definition::Schema(post_schema(&registry)),
            AttributeOptions::default(),
        )
        .unwrap();
        let schema = b.build();
        let inst = build(&schema, Some(&Value::from(json!({"post": {"id": 1}}))));
        let text = serde_json::to_value(&inst).unwrap();
        assert_eq!(text, inst.to_json());
        assert_eq!(text["post"]["author"], json!(null));
    }
}
