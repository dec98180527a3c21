//! `length`: characters for text, element count for lists and maps.
//!
//! Other values are measured by their rendered text; null measures zero.
//! `in` takes `{minimum, maximum}`. Each bound has its own message override
//! (`too_short`, `too_long`, `wrong_length`).

use paramkit_core::scalar::to_text;
use paramkit_core::Value;

use crate::options::RuleOptions;

pub fn length(value: &Value, opts: &RuleOptions<'_>) -> Vec<String> {
    let len = measure(value);
    let range = opts.get("in");
    let bound = |key: &str| {
        opts.count(key)
            .or_else(|| range.and_then(|r| RuleOptions::new(r).count(key)))
    };

    let mut errors = Vec::new();
    if let Some(is) = opts.count("is") {
        if len != is {
            errors.push(failure(opts, "wrong_length", "is the wrong length (should be", is, value));
        }
    }
    if let Some(min) = bound("minimum") {
        if len < min {
            errors.push(failure(opts, "too_short", "is too short (minimum is", min, value));
        }
    }
    if let Some(max) = bound("maximum") {
        if len > max {
            errors.push(failure(opts, "too_long", "is too long (maximum is", max, value));
        }
    }
    errors
}

fn failure(opts: &RuleOptions<'_>, key: &str, lead: &str, count: usize, value: &Value) -> String {
    let unit = if count == 1 { "character" } else { "characters" };
    let default = format!("{lead} %{{count}} {unit})");
    opts.message_for(key, &default, Some(&count.to_string()), value)
}

fn measure(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Map(map) => map.len(),
        other => to_text(other).chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(value: serde_json::Value, options: serde_json::Value) -> Vec<String> {
        let raw = Value::from(options);
        length(&Value::from(value), &RuleOptions::new(&raw))
    }

    #[test]
    fn test_minimum_counts_characters() {
        assert_eq!(
            check(json!("a"), json!({"minimum": 2})),
            ["is too short (minimum is 2 characters)"]
        );
        assert!(check(json!("ab"), json!({"minimum": 2})).is_empty());
        assert!(check(json!("éé"), json!({"maximum": 2})).is_empty());
    }

    #[test]
    fn test_singular_unit() {
        assert_eq!(
            check(json!(""), json!({"minimum": 1})),
            ["is too short (minimum is 1 character)"]
        );
    }

    #[test]
    fn test_maximum_and_range() {
        assert_eq!(
            check(json!("abcdef"), json!({"maximum": 5})),
            ["is too long (maximum is 5 characters)"]
        );
        assert_eq!(
            check(json!("a"), json!({"in": {"minimum": 2, "maximum": 4}})),
            ["is too short (minimum is 2 characters)"]
        );
    }

    #[test]
    fn test_lists_are_counted() {
        assert_eq!(
            check(json!([1, 2, 3]), json!({"is": 2})),
            ["is the wrong length (should be 2 characters)"]
        );
        assert_eq!(
            check(
                json!([1]),
                json!({"is": 2, "wrong_length": "is the wrong count (should be %{count} sections)"})
            ),
            ["is the wrong count (should be 2 sections)"]
        );
    }

    #[test]
    fn test_null_measures_zero() {
        assert_eq!(
            check(json!(null), json!({"minimum": 1})),
            ["is too short (minimum is 1 character)"]
        );
        assert!(check(json!(null), json!({"maximum": 3})).is_empty());
    }
}
