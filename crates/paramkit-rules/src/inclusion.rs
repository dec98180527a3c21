//! `inclusion` and `exclusion`.
//!
//! The allowed set comes from `in` (or `within`), or from the options
//! themselves when they are a list. A numeric set given as
//! `{minimum, maximum}` under `in` is treated as an inclusive range.

use paramkit_core::Value;

use crate::options::{numeric, RuleOptions};

pub const NOT_INCLUDED: &str = "is not included in the list";
pub const RESERVED: &str = "is reserved";

pub fn inclusion(value: &Value, opts: &RuleOptions<'_>) -> Vec<String> {
    match member(value, opts) {
        Some(false) => vec![opts.message(NOT_INCLUDED, None, value)],
        _ => Vec::new(),
    }
}

pub fn exclusion(value: &Value, opts: &RuleOptions<'_>) -> Vec<String> {
    match member(value, opts) {
        Some(true) => vec![opts.message(RESERVED, None, value)],
        _ => Vec::new(),
    }
}

/// `None` when no set is configured.
fn member(value: &Value, opts: &RuleOptions<'_>) -> Option<bool> {
    let set = match opts.raw() {
        Value::List(_) => opts.raw(),
        _ => opts.get("in").or_else(|| opts.get("within"))?,
    };
    match set {
        Value::List(items) => Some(items.iter().any(|item| same(item, value))),
        Value::Map(_) => {
            let lo = set.get("minimum").and_then(numeric);
            let hi = set.get("maximum").and_then(numeric);
            let n = numeric(value)?;
            Some(lo.map_or(true, |lo| n >= lo) && hi.map_or(true, |hi| n <= hi))
        }
        other => {
            tracing::warn!(set = %other, "inclusion set is neither a list nor a range");
            None
        }
    }
}

/// Equality that lets `1` match `1.0`.
fn same(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}
