//! # Scopes
//!
//! A [`Scope`] is the explicit context an instance tree is built in. Rule
//! engines ask it named capability questions ("is the current user an
//! admin?") instead of reaching up through parent objects. The same scope is
//! shared by every node of the tree.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Answers named capability queries.
pub trait Scope: fmt::Debug + Send + Sync {
    /// `Some(answer)` when this scope provides `name`, `None` otherwise.
    fn capability(&self, name: &str) -> Option<bool>;
}

/// Explicit named flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    flags: BTreeMap<String, bool>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`.
    pub fn grant(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl Scope for Capabilities {
    fn capability(&self, name: &str) -> Option<bool> {
        self.flags.get(name).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Capabilities {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Ordered fallback: the first scope that provides a capability answers.
#[derive(Debug, Clone, Default)]
pub struct ScopeChain {
    scopes: Vec<Arc<dyn Scope>>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scope consulted after the ones already in the chain.
    pub fn then(mut self, scope: Arc<dyn Scope>) -> Self {
        self.scopes.push(scope);
        self
    }
}

impl Scope for ScopeChain {
    fn capability(&self, name: &str) -> Option<bool> {
        self.scopes.iter().find_map(|s| s.capability(name))
    }
}
