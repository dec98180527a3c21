//! `format`: text must match `with` and must not match `without`.
//!
//! A bare string as options is shorthand for `with`. Patterns are compiled
//! once per engine and cached by source.

use std::collections::HashMap;

use paramkit_core::scalar::to_text;
use paramkit_core::Value;
use parking_lot::Mutex;
use regex::Regex;

use crate::options::RuleOptions;

pub const INVALID: &str = "is invalid";

/// Compiled patterns keyed by source. Invalid patterns cache as `None`.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: Mutex<HashMap<String, Option<Regex>>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, source: &str) -> Option<Regex> {
        let mut compiled = self.compiled.lock();
        compiled
            .entry(source.to_string())
            .or_insert_with(|| match Regex::new(source) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::warn!(pattern = source, error = %e, "invalid format pattern, rule skipped");
                    None
                }
            })
            .clone()
    }

    pub fn check(&self, value: &Value, opts: &RuleOptions<'_>) -> Vec<String> {
        let (with, without) = match opts.raw() {
            Value::String(pattern) => (Some(pattern.as_str()), None),
            _ => (opts.text("with"), opts.text("without")),
        };
        let text = to_text(value);
        let fails_with = with
            .and_then(|p| self.get(p))
            .is_some_and(|re| !re.is_match(&text));
        let fails_without = without
            .and_then(|p| self.get(p))
            .is_some_and(|re| re.is_match(&text));
        if fails_with || fails_without {
            vec![opts.message(INVALID, None, value)]
        } else {
            Vec::new()
        }
    }
}
