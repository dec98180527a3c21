//! `numericality`.
//!
//! Numbers pass as-is; text passes when it parses as a number in full.
//! Every configured comparison is checked, so one value can fail several.

use paramkit_core::scalar::format_float;
use paramkit_core::Value;

use crate::options::{numeric, RuleOptions};

pub const NOT_A_NUMBER: &str = "is not a number";
pub const NOT_AN_INTEGER: &str = "must be an integer";

/// `(option, message prefix, holds)` for the bound comparisons.
const COMPARISONS: [(&str, &str, fn(f64, f64) -> bool); 6] = [
    ("greater_than", "must be greater than", |v: f64, b: f64| v > b),
    ("greater_than_or_equal_to", "must be greater than or equal to", |v: f64, b: f64| v >= b),
    ("equal_to", "must be equal to", |v: f64, b: f64| v == b),
    ("other_than", "must be other than", |v: f64, b: f64| v != b),
    ("less_than", "must be less than", |v: f64, b: f64| v < b),
    ("less_than_or_equal_to", "must be less than or equal to", |v: f64, b: f64| v <= b),
];

pub fn numericality(value: &Value, opts: &RuleOptions<'_>) -> Vec<String> {
    let Some(n) = numeric(value) else {
        return vec![opts.message(NOT_A_NUMBER, None, value)];
    };
    if opts.flag("only_integer") && !is_integral(value, n) {
        return vec![opts.message(NOT_AN_INTEGER, None, value)];
    }

    let mut errors = Vec::new();
    for (key, prefix, holds) in COMPARISONS {
        let Some(bound) = opts.number(key) else {
            continue;
        };
        if !holds(n, bound) {
            let count = render_bound(bound);
            let default = format!("{prefix} %{{count}}");
            errors.push(opts.message(&default, Some(&count), value));
        }
    }
    if opts.flag("odd") && !is_odd(n) {
        errors.push(opts.message("must be odd", None, value));
    }
    if opts.flag("even") && !is_even(n) {
        errors.push(opts.message("must be even", None, value));
    }
    errors
}

fn is_integral(value: &Value, n: f64) -> bool {
    match value {
        Value::Integer(_) => true,
        Value::String(s) => s.trim().parse::<i64>().is_ok(),
        _ => n.fract() == 0.0,
    }
}

fn is_odd(n: f64) -> bool {
    n.fract() == 0.0 && n.rem_euclid(2.0) == 1.0
}

fn is_even(n: f64) -> bool {
    n.fract() == 0.0 && n.rem_euclid(2.0) == 0.0
}

/// Whole bounds render without a fraction (`17`, not `17.0`).
fn render_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        format!("{}", bound as i64)
    } else {
        format_float(bound)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn integers_pass_only_integer(n in any::<i64>()) {
            let raw = Value::from(serde_json::json!({"only_integer": true}));
            prop_assert!(numericality(&Value::Integer(n), &RuleOptions::new(&raw)).is_empty());
        }

        #[test]
        fn greater_than_agrees_with_comparison(n in -1000i64..1000, bound in -1000i64..1000) {
            let raw = Value::from(serde_json::json!({"greater_than": bound}));
            let errors = numericality(&Value::Integer(n), &RuleOptions::new(&raw));
            prop_assert_eq!(errors.is_empty(), n > bound);
        }
    }
}
