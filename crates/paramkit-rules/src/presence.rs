//! `presence` and `absence`.
//!
//! Blank means null, whitespace-only text, or an empty list or map. `false`
//! is a value and counts as present.

use paramkit_core::Value;

use crate::options::RuleOptions;

pub const BLANK: &str = "can't be blank";
pub const PRESENT: &str = "must be blank";

pub fn presence(value: &Value, opts: &RuleOptions<'_>) -> Vec<String> {
    if value.is_blank() {
        vec![opts.message(BLANK, None, value)]
    } else {
        Vec::new()
    }
}

pub fn absence(value: &Value, opts: &RuleOptions<'_>) -> Vec<String> {
    if value.is_blank() {
        Vec::new()
    } else {
        vec![opts.message(PRESENT, None, value)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(rule: fn(&Value, &RuleOptions<'_>) -> Vec<String>, value: serde_json::Value) -> Vec<String> {
        rule(&Value::from(value), &RuleOptions::new(&Value::Bool(true)))
    }

    #[test]
    fn test_presence_rejects_blank_values() {
        for blank in [json!(null), json!(""), json!("   "), json!([]), json!({})] {
            assert_eq!(run(presence, blank), [BLANK]);
        }
        for present in [json!(false), json!(0), json!("x"), json!([null])] {
            assert!(run(presence, present).is_empty());
        }
    }

    #[test]
    fn test_absence_is_the_inverse() {
        assert!(run(absence, json!(null)).is_empty());
        assert_eq!(run(absence, json!("x")), [PRESENT]);
    }

    #[test]
    fn test_custom_message() {
        let raw = Value::from(json!({"message": "blank1"}));
        assert_eq!(presence(&Value::Null, &RuleOptions::new(&raw)), ["blank1"]);
    }
}
