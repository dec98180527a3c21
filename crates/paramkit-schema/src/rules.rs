//! # Rule Engine Contract
//!
//! The aggregator hands a rule engine one [`RuleContext`] per instance node:
//! the node's flat attribute map, the rule bindings captured at declaration
//! time, and the tree's scope. The engine answers with per-attribute
//! messages. Engines must be query-only.

use std::sync::Arc;

use paramkit_core::{Map, Value};
use serde::{Deserialize, Serialize};

use crate::instance::Instance;
use crate::schema::RuleSpec;
use crate::scope::Scope;

/// A local failure reported by a rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeError {
    pub attribute: String,
    pub message: String,
}

impl AttributeError {
    pub fn new(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}

/// What a rule engine sees of one instance.
#[derive(Debug)]
pub struct RuleContext<'a> {
    attributes: Map,
    rules: Vec<(&'a str, &'a RuleSpec)>,
    scope: Option<&'a Arc<dyn Scope>>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        attributes: Map,
        rules: Vec<(&'a str, &'a RuleSpec)>,
        scope: Option<&'a Arc<dyn Scope>>,
    ) -> Self {
        Self {
            attributes,
            rules,
            scope,
        }
    }

    pub(crate) fn for_instance(instance: &'a Instance) -> Self {
        Self::new(
            instance.attributes(),
            instance.schema().rules(),
            instance.scope(),
        )
    }

    /// Plain value of `attribute`; `Null` for undeclared names.
    pub fn value(&self, attribute: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.attributes.get(attribute).unwrap_or(&NULL)
    }

    pub fn attributes(&self) -> &Map {
        &self.attributes
    }

    /// Rule bindings in evaluation order.
    pub fn rules(&self) -> &[(&'a str, &'a RuleSpec)] {
        &self.rules
    }

    pub fn scope(&self) -> Option<&'a Arc<dyn Scope>> {
        self.scope
    }

    /// Whether the scope grants `name`. Missing scopes and capabilities the
    /// scope does not provide both count as `false`.
    pub fn capability(&self, name: &str) -> bool {
        self.scope
            .and_then(|s| s.capability(name))
            .unwrap_or(false)
    }
}

/// Evaluates the rules of one instance node.
pub trait RuleEngine {
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<AttributeError>;
}

/// An engine that accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RuleEngine for NoRules {
    fn check(&self, _ctx: &RuleContext<'_>) -> Vec<AttributeError> {
        Vec::new()
    }
}

impl<E: RuleEngine + ?Sized> RuleEngine for &E {
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<AttributeError> {
        (**self).check(ctx)
    }
}

impl<E: RuleEngine + ?Sized> RuleEngine for Box<E> {
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<AttributeError> {
        (**self).check(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::Capabilities;

    #[test]
    fn test_value_defaults_to_null() {
        let mut attributes = Map::new();
        attributes.insert("id".into(), Value::Integer(1));
        let ctx = RuleContext::new(attributes, Vec::new(), None);
        assert_eq!(ctx.value("id"), &Value::Integer(1));
        assert_eq!(ctx.value("other"), &Value::Null);
    }

    #[test]
    fn test_capability_without_scope_is_false() {
        let ctx = RuleContext::new(Map::new(), Vec::new(), None);
        assert!(!ctx.capability("admin"));

        let scope: Arc<dyn Scope> = Arc::new(Capabilities::new().grant("admin", true));
        let ctx = RuleContext::new(Map::new(), Vec::new(), Some(&scope));
        assert!(ctx.capability("admin"));
        assert!(!ctx.capability("owner"));
    }

    #[test]
    fn test_no_rules_accepts_everything() {
        let ctx = RuleContext::new(Map::new(), Vec::new(), None);
        assert!(NoRules.check(&ctx).is_empty());
    }
}
