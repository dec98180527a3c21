//! # paramkit-rules — Standard Rule Engine
//!
//! [`StandardRules`] implements [`paramkit_schema::RuleEngine`] with the
//! conventional validation vocabulary:
//!
//! | Rule | Options | Default message |
//! |------|---------|-----------------|
//! | `presence` | | `can't be blank` |
//! | `absence` | | `must be blank` |
//! | `numericality` | `only_integer`, `greater_than`, `greater_than_or_equal_to`, `equal_to`, `other_than`, `less_than`, `less_than_or_equal_to`, `odd`, `even` | `is not a number`, `must be greater than N`, ... |
//! | `length` | `minimum`, `maximum`, `is`, `in` | `is too short (minimum is N characters)`, ... |
//! | `inclusion` / `exclusion` | `in` | `is not included in the list` / `is reserved` |
//! | `format` | `with`, `without` | `is invalid` |
//!
//! ## Common Options
//!
//! Every rule accepts `message` (replaces the default message), `allow_nil`,
//! `allow_blank`, and the conditions `if` / `unless`. A condition is a
//! capability name resolved through the instance scope, `{present: attr}` or
//! `{blank: attr}` over the instance's own attributes, or a list of these.
//! Rule options of `false` disable the rule.
//!
//! Messages may interpolate `%{count}` (the bound a rule was checked
//! against) and `%{value}`.
//!
//! ## Custom Rules
//!
//! [`StandardRules::with_rule`] registers a closure under a rule name. It
//! receives the attribute value, the rule options and the [`RuleContext`],
//! and returns `Some(message)` on failure.
//!
//! [`RuleContext`]: paramkit_schema::RuleContext

pub mod engine;
pub mod format;
pub mod inclusion;
pub mod length;
pub mod numericality;
pub mod options;
pub mod presence;

pub use engine::StandardRules;
pub use options::RuleOptions;
