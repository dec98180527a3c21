//! # Standard Rule Engine
//!
//! Dispatches each rule binding of a [`RuleContext`] to a built-in check or
//! to a registered custom rule, after applying the options every rule
//! shares (`false` disables, `if` / `unless`, `allow_nil` / `allow_blank`).
//! Errors come back in binding order.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use paramkit_core::Value;
use paramkit_schema::{AttributeError, RuleContext, RuleEngine};

use crate::format::PatternCache;
use crate::inclusion::{exclusion, inclusion};
use crate::length::length;
use crate::numericality::numericality;
use crate::options::RuleOptions;
use crate::presence::{absence, presence};

/// Names handled without registration.
pub const BUILTIN_RULES: [&str; 7] = [
    "absence",
    "exclusion",
    "format",
    "inclusion",
    "length",
    "numericality",
    "presence",
];

/// A custom rule: `(value, options, context)` to an optional failure message.
pub type CustomRule = dyn Fn(&Value, &Value, &RuleContext<'_>) -> Option<String> + Send + Sync;

/// Built-in rules plus any custom rules registered by name.
#[derive(Default)]
pub struct StandardRules {
    custom: HashMap<String, Arc<CustomRule>>,
    patterns: PatternCache,
}

impl StandardRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` under `name`. A custom rule shadows a built-in of the
    /// same name.
    pub fn with_rule<F>(mut self, name: impl Into<String>, rule: F) -> Self
    where
        F: Fn(&Value, &Value, &RuleContext<'_>) -> Option<String> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(rule = %name, "custom rule registered");
        self.custom.insert(name, Arc::new(rule));
        self
    }

    /// Every rule name this engine understands, sorted.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = BUILTIN_RULES
            .iter()
            .copied()
            .chain(self.custom.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Messages from one rule; `None` when the name is unknown.
    fn evaluate(
        &self,
        name: &str,
        value: &Value,
        opts: &RuleOptions<'_>,
        ctx: &RuleContext<'_>,
    ) -> Option<Vec<String>> {
        if let Some(rule) = self.custom.get(name) {
            let failure = rule(value, opts.raw(), ctx);
            return Some(
                failure
                    .map(|m| opts.message(&m, None, value))
                    .into_iter()
                    .collect(),
            );
        }
        let messages = match name {
            "presence" => presence(value, opts),
            "absence" => absence(value, opts),
            "numericality" => numericality(value, opts),
            "length" => length(value, opts),
            "inclusion" => inclusion(value, opts),
            "exclusion" => exclusion(value, opts),
            "format" => self.patterns.check(value, opts),
            _ => return None,
        };
        Some(messages)
    }
}

impl RuleEngine for StandardRules {
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<AttributeError> {
        let mut errors = Vec::new();
        for (attribute, spec) in ctx.rules() {
            let opts = RuleOptions::new(&spec.options);
            if opts.is_disabled() || !opts.conditions_hold(ctx) {
                continue;
            }
            let value = ctx.value(attribute);
            if opts.skips(value) {
                continue;
            }
            match self.evaluate(&spec.name, value, &opts, ctx) {
                Some(messages) => errors.extend(
                    messages
                        .into_iter()
                        .map(|m| AttributeError::new(*attribute, m)),
                ),
                None => tracing::warn!(
                    rule = %spec.name,
                    attribute = %attribute,
                    "unknown rule, skipped"
                ),
            }
        }
        errors
    }
}

impl fmt::Debug for StandardRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut custom: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        custom.sort_unstable();
        f.debug_struct("StandardRules")
            .field("custom", &custom)
            .finish_non_exhaustive()
    }
}
