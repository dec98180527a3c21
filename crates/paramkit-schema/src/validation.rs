//! # Nested Validation
//!
//! [`Validator`] walks an instance tree and folds every node's rule failures
//! into one ordered list of qualified errors.
//!
//! ## Ordering
//!
//! At each node the local errors (as the rule engine reports them) come
//! first. Nested errors follow in attribute declaration order: a nested
//! instance contributes `attr.<childKey>`, a struct collection contributes
//! `attr[i].<childKey>` per element in sequence order. Elements without
//! errors contribute nothing.
//!
//! Traversal always terminates because instance trees are finite: a schema
//! cannot reference itself or an ancestor (named definitions must already be
//! defined when they are referenced).

use std::fmt;

use paramkit_core::KeyPath;
use serde::{Deserialize, Serialize};

use crate::instance::{AttributeValue, Instance};
use crate::rules::{RuleContext, RuleEngine};

/// One failure, keyed by its path from the validation root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Qualified key, e.g. `sections[0].id`.
    pub key: String,
    /// Message produced by the rule engine.
    pub message: String,
}

impl ValidationError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Key and message as a sentence, e.g. `Post id can't be blank`.
    pub fn full_message(&self) -> String {
        if self.key == "base" {
            return self.message.clone();
        }
        format!("{} {}", humanize(&self.key), self.message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

fn humanize(key: &str) -> String {
    let spaced: String = key
        .chars()
        .map(|c| if c == '_' || c == '.' { ' ' } else { c })
        .collect();
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Ordered list of qualified validation errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages reported under exactly `key`.
    pub fn messages_for(&self, key: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.key == key)
            .map(|e| e.message.as_str())
            .collect()
    }

    /// Distinct keys in first-reported order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for e in &self.errors {
            if !keys.contains(&e.key.as_str()) {
                keys.push(&e.key);
            }
        }
        keys
    }

    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(ValidationError::full_message).collect()
    }

    /// `(key, message)` pairs, in order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.errors
            .iter()
            .map(|e| (e.key.as_str(), e.message.as_str()))
            .collect()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {e}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl FromIterator<ValidationError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

/// Runs a rule engine over an instance tree.
#[derive(Debug)]
pub struct Validator<'e, E: RuleEngine + ?Sized> {
    engine: &'e E,
}

impl<'e, E: RuleEngine + ?Sized> Validator<'e, E> {
    pub fn new(engine: &'e E) -> Self {
        Self { engine }
    }

    /// Qualified errors for `instance` and every instance below it.
    pub fn validate(&self, instance: &Instance) -> ValidationErrors {
        let errors: ValidationErrors = self.collect(instance).into_iter().collect();
        if !errors.is_empty() {
            tracing::debug!(
                schema = instance.schema().name().unwrap_or("<anonymous>"),
                errors = errors.len(),
                "validation failed"
            );
        }
        errors
    }

    pub fn is_valid(&self, instance: &Instance) -> bool {
        self.collect(instance).is_empty()
    }

    fn collect(&self, instance: &Instance) -> Vec<ValidationError> {
        let ctx = RuleContext::for_instance(instance);
        let mut errors: Vec<ValidationError> = self
            .engine
            .check(&ctx)
            .into_iter()
            .map(|e| ValidationError::new(e.attribute, e.message))
            .collect();

        for (name, value) in instance.iter() {
            match value {
                AttributeValue::Struct(Some(child)) => {
                    let prefix = KeyPath::attr(name);
                    errors.extend(self.qualified(&prefix, child));
                }
                AttributeValue::StructCollection(items) => {
                    for (i, child) in items.iter().enumerate() {
                        let prefix = KeyPath::attr(name).index(i);
                        errors.extend(self.qualified(&prefix, child));
                    }
                }
                _ => {}
            }
        }
        errors
    }

    fn qualified(&self, prefix: &KeyPath, child: &Instance) -> Vec<ValidationError> {
        self.collect(child)
            .into_iter()
            .map(|e| ValidationError::new(prefix.qualify(&e.key), e.message))
            .collect()
    }
}
