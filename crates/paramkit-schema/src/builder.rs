//! # Schema Builder
//!
//! [`SchemaBuilder`] is the registrar used to declare a struct kind. It
//! borrows a [`TypeRegistry`] and resolves every type name through it when
//! the attribute is declared, so later registry changes never reach schemas
//! that were already declared.
//!
//! Nested struct kinds are declared inline with closures that receive a fresh
//! builder over the same registry:
//!
//! ```
//! use paramkit_schema::{build, AttributeOptions, SchemaBuilder, TypeRegistry, Value};
//!
//! let registry = TypeRegistry::with_builtins();
//! let mut b = SchemaBuilder::new(&registry);
//! b.integer("id", AttributeOptions::default())?
//!     .struct_block("post", AttributeOptions::default(), |post| {
//!         post.string("title", AttributeOptions::default())?;
//!         Ok(())
//!     })?;
//! let schema = b.build();
//!
//! let raw = Value::from(serde_json::json!({"id": "7", "post": {"title": 3}}));
//! let params = build(&schema, Some(&raw));
//! assert_eq!(params.to_json(), serde_json::json!({"id": 7, "post": {"title": "3"}}));
//! # Ok::<(), paramkit_schema::DeclarationError>(())
//! ```
//!
//! ## Inheritance
//!
//! [`SchemaBuilder::derive`] starts from a copy of a base schema's attribute
//! table and rule bindings. Declarations on the derived builder add or
//! override entries; the base schema is never touched. Descriptors are shared
//! with the base, which is safe because they are immutable.

use std::sync::Arc;

use paramkit_core::{DeclarationError, Map, Value};

use crate::descriptor::{
    CollectionType, Normalizer, ScalarType, StructCollectionType, StructType, TypeDescriptor,
};
use crate::registry::TypeRegistry;
use crate::schema::{Attribute, RuleSpec, Schema};

/// Reference to the nested schema of a struct-valued attribute.
#[derive(Debug, Clone)]
pub enum Definition {
    /// An already-built schema.
    Schema(Arc<Schema>),
    /// A schema defined in the registry under this name.
    Named(String),
}

impl From<Arc<Schema>> for Definition {
    fn from(schema: Arc<Schema>) -> Self {
        Definition::Schema(schema)
    }
}

impl From<&Arc<Schema>> for Definition {
    fn from(schema: &Arc<Schema>) -> Self {
        Definition::Schema(Arc::clone(schema))
    }
}

impl From<&str> for Definition {
    fn from(name: &str) -> Self {
        Definition::Named(name.to_string())
    }
}

impl From<String> for Definition {
    fn from(name: String) -> Self {
        Definition::Named(name)
    }
}

/// Per-attribute declaration options.
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    default: Option<Value>,
    normalize: Option<Normalizer>,
    rules: Vec<RuleSpec>,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_normalize<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.normalize = Some(Normalizer::new(f));
        self
    }

    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalize = Some(normalizer);
        self
    }

    /// Attach a rule. Options are forwarded to the rule engine verbatim.
    pub fn rule(mut self, name: impl Into<String>, options: impl Into<Value>) -> Self {
        self.rules.push(RuleSpec::new(name, options));
        self
    }

    /// Split a flat option map: `default` sets the default, every other key
    /// becomes a rule with that key's value as options.
    pub fn from_map(map: Map) -> Self {
        map.into_iter().fold(Self::default(), |opts, (key, value)| {
            if key == "default" {
                opts.with_default(value)
            } else {
                opts.rule(key, value)
            }
        })
    }

    fn apply(self, descriptor: TypeDescriptor) -> (TypeDescriptor, Vec<RuleSpec>) {
        let mut descriptor = descriptor;
        if let Some(default) = self.default {
            descriptor = descriptor.with_default(default);
        }
        if let Some(normalize) = self.normalize {
            descriptor = descriptor.with_normalize(normalize);
        }
        (descriptor, self.rules)
    }
}

/// Registrar for one struct kind.
#[derive(Debug)]
pub struct SchemaBuilder<'r> {
    registry: &'r TypeRegistry,
    schema: Schema,
}

impl<'r> SchemaBuilder<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            schema: Schema::default(),
        }
    }

    /// Start from a copy of `base`'s attributes and rule bindings.
    pub fn derive(base: &Schema, registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            schema: Schema {
                name: None,
                attributes: base.attributes.clone(),
                validations: base.validations.clone(),
            },
        }
    }

    /// Give the schema a name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.schema.name = Some(name.into());
        self
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Declare a scalar attribute of a registered kind.
    pub fn scalar(
        &mut self,
        name: &str,
        kind: &str,
        opts: AttributeOptions,
    ) -> Result<&mut Self, DeclarationError> {
        let scalar = self.resolve_scalar(name, kind)?;
        self.insert(name, scalar.into(), opts)
    }

    pub fn integer(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "integer", opts)
    }

    pub fn float(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "float", opts)
    }

    pub fn decimal(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "decimal", opts)
    }

    pub fn bool(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "bool", opts)
    }

    pub fn string(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "string", opts)
    }

    pub fn date(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "date", opts)
    }

    pub fn datetime(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "datetime", opts)
    }

    pub fn time(&mut self, name: &str, opts: AttributeOptions) -> Result<&mut Self, DeclarationError> {
        self.scalar(name, "time", opts)
    }

    /// Declare a sequence of scalars of a registered kind.
    pub fn collection_field(
        &mut self,
        name: &str,
        element_kind: &str,
        opts: AttributeOptions,
    ) -> Result<&mut Self, DeclarationError> {
        let element = self.resolve_scalar(name, element_kind)?;
        self.insert(name, CollectionType::new().of(element).into(), opts)
    }

    /// Declare a nested object of an existing schema.
    pub fn struct_field(
        &mut self,
        name: &str,
        definition: impl Into<Definition>,
        opts: AttributeOptions,
    ) -> Result<&mut Self, DeclarationError> {
        let schema = self.resolve_definition(name, definition.into())?;
        self.insert(name, StructType::new(schema).into(), opts)
    }

    /// Declare a nested object whose schema is declared inline by `block`.
    pub fn struct_block<F>(
        &mut self,
        name: &str,
        opts: AttributeOptions,
        block: F,
    ) -> Result<&mut Self, DeclarationError>
    where
        F: FnOnce(&mut SchemaBuilder<'r>) -> Result<(), DeclarationError>,
    {
        let schema = self.nested(block)?;
        self.insert(name, StructType::new(schema).into(), opts)
    }

    /// Declare a sequence of nested objects of an existing schema.
    pub fn struct_collection_field(
        &mut self,
        name: &str,
        definition: impl Into<Definition>,
        opts: AttributeOptions,
    ) -> Result<&mut Self, DeclarationError> {
        let schema = self.resolve_definition(name, definition.into())?;
        self.insert(name, StructCollectionType::new(schema).into(), opts)
    }

    /// Declare a sequence of nested objects whose schema is declared inline.
    pub fn struct_collection_block<F>(
        &mut self,
        name: &str,
        opts: AttributeOptions,
        block: F,
    ) -> Result<&mut Self, DeclarationError>
    where
        F: FnOnce(&mut SchemaBuilder<'r>) -> Result<(), DeclarationError>,
    {
        let schema = self.nested(block)?;
        self.insert(name, StructCollectionType::new(schema).into(), opts)
    }

    /// Insert an already-built descriptor.
    pub fn attribute(
        &mut self,
        name: &str,
        descriptor: TypeDescriptor,
        rules: Vec<RuleSpec>,
    ) -> Result<&mut Self, DeclarationError> {
        check_name(name)?;
        let attribute = Attribute {
            name: name.to_string(),
            descriptor,
            rules,
        };
        match self.schema.attributes.iter_mut().find(|a| a.name == name) {
            Some(slot) => {
                tracing::debug!(attribute = %name, "attribute overridden");
                *slot = attribute;
            }
            None => self.schema.attributes.push(attribute),
        }
        Ok(self)
    }

    /// Bind a rule to one or more declared attributes.
    pub fn validates(
        &mut self,
        attributes: &[&str],
        rule: RuleSpec,
    ) -> Result<&mut Self, DeclarationError> {
        if let Some(missing) = attributes.iter().find(|a| !self.schema.contains(a)) {
            return Err(DeclarationError::UnknownAttribute {
                attribute: missing.to_string(),
            });
        }
        for attribute in attributes {
            self.schema
                .validations
                .push((attribute.to_string(), rule.clone()));
        }
        Ok(self)
    }

    /// Re-open a struct or struct-collection attribute.
    ///
    /// `block` extends a schema derived from the attribute's current nested
    /// schema. The attribute keeps its default, normalizer and rules.
    pub fn extend<F>(&mut self, name: &str, block: F) -> Result<&mut Self, DeclarationError>
    where
        F: FnOnce(&mut SchemaBuilder<'r>) -> Result<(), DeclarationError>,
    {
        let registry = self.registry;
        let slot = self
            .schema
            .attributes
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| DeclarationError::UnknownAttribute {
                attribute: name.to_string(),
            })?;
        let base = slot
            .descriptor
            .nested_schema()
            .ok_or_else(|| DeclarationError::NotExtensible {
                attribute: name.to_string(),
            })?;

        let mut nested = SchemaBuilder::derive(base, registry);
        block(&mut nested)?;
        let schema = nested.build();

        let replacement: TypeDescriptor = match &slot.descriptor {
            TypeDescriptor::StructCollection(_) => StructCollectionType::new(schema).into(),
            _ => StructType::new(schema).into(),
        };
        slot.descriptor = slot.descriptor.carry_settings_to(replacement);
        tracing::debug!(attribute = %name, "attribute re-opened");
        Ok(self)
    }

    /// Freeze the declared schema.
    pub fn build(self) -> Arc<Schema> {
        Arc::new(self.schema)
    }

    fn insert(
        &mut self,
        name: &str,
        descriptor: TypeDescriptor,
        opts: AttributeOptions,
    ) -> Result<&mut Self, DeclarationError> {
        let (descriptor, rules) = opts.apply(descriptor);
        self.attribute(name, descriptor, rules)
    }

    fn nested<F>(&self, block: F) -> Result<Arc<Schema>, DeclarationError>
    where
        F: FnOnce(&mut SchemaBuilder<'r>) -> Result<(), DeclarationError>,
    {
        let mut nested = SchemaBuilder::new(self.registry);
        block(&mut nested)?;
        Ok(nested.build())
    }

    fn resolve_scalar(&self, attribute: &str, kind: &str) -> Result<ScalarType, DeclarationError> {
        self.registry
            .scalar(kind)
            .cloned()
            .ok_or_else(|| DeclarationError::UnknownType {
                attribute: attribute.to_string(),
                type_name: kind.to_string(),
            })
    }

    fn resolve_definition(
        &self,
        attribute: &str,
        definition: Definition,
    ) -> Result<Arc<Schema>, DeclarationError> {
        match definition {
            Definition::Schema(schema) => Ok(schema),
            Definition::Named(name) => {
                if let Some(schema) = self.registry.schema(&name) {
                    return Ok(Arc::clone(schema));
                }
                let reason = if self.registry.contains(&name) {
                    format!("`{name}` is a scalar type")
                } else {
                    format!("no schema named `{name}` is defined")
                };
                Err(DeclarationError::InvalidDefinition {
                    attribute: attribute.to_string(),
                    reason,
                })
            }
        }
    }
}

fn check_name(name: &str) -> Result<(), DeclarationError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(['.', '[', ']']) {
        "name must not contain `.`, `[` or `]`"
    } else {
        return Ok(());
    };
    Err(DeclarationError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::build;
    use serde_json::json;

    fn opts() -> AttributeOptions {
        AttributeOptions::default()
    }

    #[test]
    fn test_redeclaring_overwrites_in_place() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        b.integer("id", opts().rule("presence", true))
            .unwrap()
            .string("name", opts())
            .unwrap()
            .string("id", opts())
            .unwrap();
        let schema = b.build();
        assert_eq!(schema.names().collect::<Vec<_>>(), ["id", "name"]);
        assert!(schema.get("id").unwrap().rules.is_empty());
        let inst = build(&schema, Some(&Value::from(json!({"id": 5}))));
        assert_eq!(inst.value("id"), Some(&Value::from("5")));
    }

    #[test]
    fn test_derive_isolates_base() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry).named("Base");
        b.integer("id", opts()).unwrap();
        let base = b.build();

        let mut d = SchemaBuilder::derive(&base, &registry).named("Derived");
        d.string("title", opts()).unwrap().string("id", opts()).unwrap();
        let derived = d.build();

        assert_eq!(base.names().collect::<Vec<_>>(), ["id"]);
        assert_eq!(derived.names().collect::<Vec<_>>(), ["id", "title"]);
        let raw = Value::from(json!({"id": 5}));
        assert_eq!(build(&base, Some(&raw)).value("id"), Some(&Value::Integer(5)));
        assert_eq!(build(&derived, Some(&raw)).value("id"), Some(&Value::from("5")));
        assert_eq!(derived.name(), Some("Derived"));
    }

    #[test]
    fn test_validations_are_inherited_and_accumulate() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        b.integer("id", opts())
            .unwrap()
            .validates(&["id"], RuleSpec::new("presence", true))
            .unwrap();
        let base = b.build();
        let mut d = SchemaBuilder::derive(&base, &registry);
        d.validates(&["id"], RuleSpec::new("numericality", json!({"greater_than": 1})))
            .unwrap();
        let derived = d.build();
        assert_eq!(base.validations().len(), 1);
        assert_eq!(derived.validations().len(), 2);
    }

    #[test]
    fn test_validates_unknown_attribute_fails() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        let err = b
            .validates(&["ghost"], RuleSpec::new("presence", true))
            .unwrap_err();
        assert_eq!(
            err,
            DeclarationError::UnknownAttribute {
                attribute: "ghost".into()
            }
        );
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        for name in ["", "a.b", "items[0]", "x]"] {
            assert!(matches!(
                b.integer(name, opts()),
                Err(DeclarationError::InvalidName { .. })
            ));
        }
        assert!(b.build().is_empty());
    }

    #[test]
    fn test_unknown_scalar_kind() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        let err = b.scalar("load", "weight", opts()).unwrap_err();
        assert_eq!(
            err,
            DeclarationError::UnknownType {
                attribute: "load".into(),
                type_name: "weight".into()
            }
        );
        assert!(b.collection_field("loads", "weight", opts()).is_err());
    }

    #[test]
    fn test_struct_definition_must_be_a_schema() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        let err = b.struct_field("owner", "integer", opts()).unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::InvalidDefinition { ref attribute, ref reason }
                if attribute == "owner" && reason.contains("scalar type")
        ));
        let err = b
            .struct_collection_field("users", "User", opts())
            .unwrap_err();
        assert!(matches!(err, DeclarationError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_named_definition_resolves_through_registry() {
        let mut registry = TypeRegistry::with_builtins();
        let mut u = SchemaBuilder::new(&registry).named("User");
        u.string("name", opts()).unwrap();
        let user = u.build();
        registry.define("User", user);

        let mut b = SchemaBuilder::new(&registry);
        b.struct_collection_field("users", "User", opts()).unwrap();
        let schema = b.build();
        let inst = build(&schema, Some(&Value::from(json!({"users": [{"name": 1}]}))));
        assert_eq!(inst.to_json(), json!({"users": [{"name": "1"}]}));
    }

    #[test]
    fn test_extend_preserves_default_and_rules() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        b.struct_block(
            "post",
            opts().with_default(json!({"id": 1})).rule("presence", true),
            |p| {
                p.integer("id", opts())?;
                Ok(())
            },
        )
        .unwrap()
        .extend("post", |p| {
            p.string("title", opts().with_default("untitled"))?;
            Ok(())
        })
        .unwrap();
        let schema = b.build();
        assert_eq!(schema.get("post").unwrap().rules.len(), 1);
        let inst = build(&schema, None);
        assert_eq!(inst.to_json(), json!({"post": {"id": 1, "title": "untitled"}}));
    }

    #[test]
    fn test_extend_struct_collection_keeps_kind() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        b.struct_collection_block("comments", opts(), |c| {
            c.string("body", opts())?;
            Ok(())
        })
        .unwrap()
        .extend("comments", |c| {
            c.integer("votes", opts().with_default(0))?;
            Ok(())
        })
        .unwrap();
        let schema = b.build();
        let inst = build(&schema, Some(&Value::from(json!({"comments": [{"body": "a"}]}))));
        assert_eq!(inst.to_json(), json!({"comments": [{"body": "a", "votes": 0}]}));
    }

    #[test]
    fn test_extend_errors() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        b.integer("id", opts()).unwrap();
        assert!(matches!(
            b.extend("post", |_| Ok(())),
            Err(DeclarationError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            b.extend("id", |_| Ok(())),
            Err(DeclarationError::NotExtensible { .. })
        ));
    }

    #[test]
    fn test_block_errors_propagate() {
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        let err = b
            .struct_block("post", opts(), |p| {
                p.scalar("x", "nope", opts())?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownType { .. }));
        assert!(!b.build().contains("post"));
    }

    #[test]
    fn test_options_from_map_split_default() {
        let map = match Value::from(json!({"default": 3, "presence": true, "length": {"maximum": 5}})) {
            Value::Map(m) => m,
            _ => unreachable!(),
        };
        let registry = TypeRegistry::with_builtins();
        let mut b = SchemaBuilder::new(&registry);
        b.integer("n", AttributeOptions::from_map(map)).unwrap();
        let schema = b.build();
        let attr = schema.get("n").unwrap();
        assert_eq!(attr.descriptor.default_value(), Some(&Value::Integer(3)));
        let names: Vec<&str> = attr.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["length", "presence"]);
    }
}
