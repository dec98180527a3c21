//! # Schemas
//!
//! A [`Schema`] is the ordered attribute table of one declared struct kind,
//! plus the rule bindings the rule engine evaluates against it. Schemas are
//! built by [`SchemaBuilder`](crate::SchemaBuilder) and frozen behind an
//! `Arc` once built. Deriving or re-opening a schema always produces a new
//! one; a built schema is never mutated.

use std::sync::Arc;

use paramkit_core::{DeclarationError, Value};
use serde::{Deserialize, Serialize};

use crate::builder::SchemaBuilder;
use crate::descriptor::TypeDescriptor;
use crate::registry::TypeRegistry;

/// A named rule and the options it was declared with.
///
/// Options are opaque to this crate and are forwarded verbatim to the rule
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub name: String,
    #[serde(default)]
    pub options: Value,
}

impl RuleSpec {
    pub fn new(name: impl Into<String>, options: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            options: options.into(),
        }
    }
}

/// One declared attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub descriptor: TypeDescriptor,
    pub rules: Vec<RuleSpec>,
}

/// The attribute table of a struct kind.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub(crate) name: Option<String>,
    pub(crate) attributes: Vec<Attribute>,
    pub(crate) validations: Vec<(String, RuleSpec)>,
}

impl Schema {
    /// The declared name; anonymous nested schemas have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Schema-level rule bindings, in declaration order.
    pub fn validations(&self) -> &[(String, RuleSpec)] {
        &self.validations
    }

    /// Every rule binding: attribute-declared rules in attribute order, then
    /// schema-level bindings.
    pub fn rules(&self) -> Vec<(&str, &RuleSpec)> {
        self.attributes
            .iter()
            .flat_map(|a| a.rules.iter().map(move |r| (a.name.as_str(), r)))
            .chain(self.validations.iter().map(|(n, r)| (n.as_str(), r)))
            .collect()
    }

    /// Derive a new schema from this one with the struct-valued attribute
    /// `attribute` re-opened by `block`.
    ///
    /// `self` is left unchanged.
    pub fn reopen<F>(
        self: &Arc<Self>,
        attribute: &str,
        registry: &TypeRegistry,
        block: F,
    ) -> Result<Arc<Schema>, DeclarationError>
    where
        F: FnOnce(&mut SchemaBuilder<'_>) -> Result<(), DeclarationError>,
    {
        let mut builder = SchemaBuilder::derive(self, registry);
        if let Some(name) = self.name() {
            builder = builder.named(name);
        }
        builder.extend(attribute, block)?;
        Ok(builder.build())
    }
}
