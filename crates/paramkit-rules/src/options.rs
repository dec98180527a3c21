//! # Rule Options
//!
//! Read-only view over the options a rule was declared with. Options arrive
//! as an arbitrary [`Value`]: `true` or `null` enable a rule with no
//! settings, `false` disables it, and a map carries named settings. Some
//! rules also accept a shorthand (a list for `inclusion`, a pattern string
//! for `format`); those are resolved by the rule itself through
//! [`RuleOptions::raw`].

use paramkit_core::scalar::to_text;
use paramkit_core::Value;
use paramkit_schema::RuleContext;

/// Options of one rule binding.
#[derive(Debug, Clone, Copy)]
pub struct RuleOptions<'a> {
    raw: &'a Value,
}

impl<'a> RuleOptions<'a> {
    pub fn new(raw: &'a Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &'a Value {
        self.raw
    }

    /// `false` turns a rule off.
    pub fn is_disabled(&self) -> bool {
        matches!(self.raw, Value::Bool(false))
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.raw.get(key)
    }

    /// `true` only when `key` is set to boolean true.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(Value::Bool(true)))
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(numeric)
    }

    /// A non-negative whole number setting, such as a length bound.
    pub fn count(&self, key: &str) -> Option<usize> {
        match self.get(key)? {
            Value::Integer(i) => usize::try_from(*i).ok(),
            other => numeric(other)
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= usize::MAX as f64)
                .map(|f| f as usize),
        }
    }

    pub fn text(&self, key: &str) -> Option<&'a str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Message for a failure: `message` when set, else `default`.
    pub fn message(&self, default: &str, count: Option<&str>, value: &Value) -> String {
        interpolate(self.text("message").unwrap_or(default), count, value)
    }

    /// Like [`message`](Self::message), but a `key`-specific override (such
    /// as `too_short`) wins over `message`. `%{count}` and `%{value}` are
    /// interpolated.
    pub fn message_for(&self, key: &str, default: &str, count: Option<&str>, value: &Value) -> String {
        let template = self
            .text(key)
            .or_else(|| self.text("message"))
            .unwrap_or(default);
        interpolate(template, count, value)
    }

    /// Whether `allow_nil` / `allow_blank` let `value` skip the rule.
    pub fn skips(&self, value: &Value) -> bool {
        (self.flag("allow_nil") && value.is_null()) || (self.flag("allow_blank") && value.is_blank())
    }

    /// Whether `if` holds and `unless` does not.
    pub fn conditions_hold(&self, ctx: &RuleContext<'_>) -> bool {
        let when = self.get("if").map_or(true, |c| all(c, ctx));
        let unless = self.get("unless").map_or(false, |c| any(c, ctx));
        when && !unless
    }
}

fn interpolate(template: &str, count: Option<&str>, value: &Value) -> String {
    let mut out = template.to_string();
    if let Some(count) = count {
        out = out.replace("%{count}", count);
    }
    if out.contains("%{value}") {
        out = out.replace("%{value}", &to_text(value));
    }
    out
}

/// Numeric reading of a value: numbers as-is, text when it parses in full.
pub(crate) fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        other => other.as_f64(),
    }
}

// ─── Conditions ──────────────────────────────────────────────────────

fn all(condition: &Value, ctx: &RuleContext<'_>) -> bool {
    match condition {
        Value::List(items) => items.iter().all(|c| holds(c, ctx)),
        single => holds(single, ctx),
    }
}

fn any(condition: &Value, ctx: &RuleContext<'_>) -> bool {
    match condition {
        Value::List(items) => items.iter().any(|c| holds(c, ctx)),
        single => holds(single, ctx),
    }
}

fn holds(condition: &Value, ctx: &RuleContext<'_>) -> bool {
    match condition {
        Value::Bool(b) => *b,
        Value::String(name) => ctx.capability(name),
        Value::Map(checks) => checks.iter().all(|(test, target)| {
            match (test.as_str(), target.as_str()) {
                ("present", Some(attr)) => !ctx.value(attr).is_blank(),
                ("blank", Some(attr)) => ctx.value(attr).is_blank(),
                ("capability", Some(name)) => ctx.capability(name),
                _ => {
                    tracing::warn!(condition = %test, "unsupported rule condition, treating as false");
                    false
                }
            }
        }),
        other => {
            tracing::warn!(condition = %other, "unsupported rule condition, treating as false");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramkit_core::Map;
    use paramkit_schema::{Capabilities, Scope};
    use serde_json::json;
    use std::sync::Arc;

    fn opts(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_disabled_only_for_false() {
        assert!(RuleOptions::new(&Value::Bool(false)).is_disabled());
        assert!(!RuleOptions::new(&Value::Bool(true)).is_disabled());
        assert!(!RuleOptions::new(&Value::Null).is_disabled());
    }

    #[test]
    fn test_count_accepts_whole_numbers_only() {
        let raw = opts(json!({"a": 3, "b": 2.0, "c": -1, "d": 1.5, "e": "4"}));
        let o = RuleOptions::new(&raw);
        assert_eq!(o.count("a"), Some(3));
        assert_eq!(o.count("b"), Some(2));
        assert_eq!(o.count("c"), None);
        assert_eq!(o.count("d"), None);
        assert_eq!(o.count("e"), Some(4));
        assert_eq!(o.count("missing"), None);
    }

    #[test]
    fn test_message_precedence_and_interpolation() {
        let raw = opts(json!({"too_short": "needs %{count}", "message": "bad %{value}"}));
        let o = RuleOptions::new(&raw);
        let v = Value::from("x");
        assert_eq!(o.message_for("too_short", "default", Some("2"), &v), "needs 2");
        assert_eq!(o.message_for("too_long", "default", None, &v), "bad x");
        assert_eq!(o.message("default", None, &v), "bad x");

        let empty = Value::Bool(true);
        let o = RuleOptions::new(&empty);
        assert_eq!(
            o.message_for("too_short", "min %{count}", Some("5"), &v),
            "min 5"
        );
    }

    #[test]
    fn test_skips_nil_and_blank() {
        let raw = opts(json!({"allow_nil": true}));
        let o = RuleOptions::new(&raw);
        assert!(o.skips(&Value::Null));
        assert!(!o.skips(&Value::from("")));

        let raw = opts(json!({"allow_blank": true}));
        let o = RuleOptions::new(&raw);
        assert!(o.skips(&Value::from("  ")));
        assert!(!o.skips(&Value::from("x")));
    }

    #[test]
    fn test_conditions_use_scope_and_attributes() {
        let mut attrs = Map::new();
        attrs.insert("published_at".into(), Value::from("2024-01-01"));
        attrs.insert("draft".into(), Value::Null);
        let scope: Arc<dyn Scope> = Arc::new(Capabilities::new().grant("owner", true));
        let ctx = RuleContext::new(attrs, Vec::new(), Some(&scope));

        let check = |json: serde_json::Value| {
            let raw = opts(json);
            RuleOptions::new(&raw).conditions_hold(&ctx)
        };
        assert!(check(json!({})));
        assert!(check(json!({"if": "owner"})));
        assert!(!check(json!({"if": "admin"})));
        assert!(check(json!({"if": {"present": "published_at"}})));
        assert!(!check(json!({"if": {"present": "draft"}})));
        assert!(check(json!({"if": ["owner", {"blank": "draft"}]})));
        assert!(!check(json!({"unless": "owner"})));
        assert!(!check(json!({"unless": ["admin", "owner"]})));
        assert!(check(json!({"unless": ["admin"]})));
    }
}
