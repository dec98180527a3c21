//! # Error Types
//!
//! Defines the error taxonomy shared across the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Declaration errors are raised synchronously at the registrar call that
//!   caused them and are fatal to that declaration.
//! - Conversion and normalization errors never reach callers of the
//!   construction API. Descriptors resolve them into the attribute default.
//! - Validation failures are data, not errors, and live in `paramkit-schema`.

use std::fmt::{self, Write};

use thiserror::Error;

/// A malformed schema declaration or type registration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeclarationError {
    /// A struct or struct-collection attribute referenced something that is
    /// not a declared schema.
    #[error("definition for attribute `{attribute}` must be a declared schema: {reason}")]
    InvalidDefinition {
        /// Attribute being declared.
        attribute: String,
        /// Why the reference was rejected.
        reason: String,
    },

    /// A custom type was registered without a conversion function.
    #[error("type `{type_name}` must be registered with a conversion function")]
    MissingConverter {
        /// Name the registration was attempted under.
        type_name: String,
    },

    /// A scalar or collection element kind is not in the registry.
    #[error("unknown type `{type_name}` for attribute `{attribute}`")]
    UnknownType {
        /// Attribute being declared.
        attribute: String,
        /// Type name that failed to resolve.
        type_name: String,
    },

    /// A rule binding or re-opening named an attribute the schema lacks.
    #[error("attribute `{attribute}` is not declared")]
    UnknownAttribute {
        /// The missing attribute.
        attribute: String,
    },

    /// Only struct-valued attributes can be re-opened.
    #[error("attribute `{attribute}` is not struct-valued and cannot be extended")]
    NotExtensible {
        /// The scalar or collection attribute.
        attribute: String,
    },

    /// Attribute names must be usable as qualified key segments.
    #[error("invalid attribute name `{name}`: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A collection declared in a descriptor file without `of`.
    #[error("collection attribute `{attribute}` requires an element type")]
    MissingElementType {
        /// Attribute being declared.
        attribute: String,
    },
}

/// A raw value could not be converted to a scalar kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot coerce {input} to {target}: {reason}")]
pub struct ConversionError {
    /// Name of the target kind (e.g. `integer`).
    pub target: String,
    /// Short rendering of the offending input.
    pub input: String,
    /// What went wrong.
    pub reason: String,
}

impl ConversionError {
    /// Build a conversion error for `target` from a displayable input.
    pub fn new(
        target: impl Into<String>,
        input: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        let mut clipped = Clipped::default();
        // An early stop from the writer only means the input was cut short.
        let _ = write!(clipped, "{input}");
        if clipped.cut {
            clipped.text.push('…');
        }
        Self {
            target: target.into(),
            input: clipped.text,
            reason: reason.into(),
        }
    }
}

const INPUT_LIMIT: usize = 64;

/// Formatter sink that keeps the first [`INPUT_LIMIT`] bytes and stops the
/// rendering there.
#[derive(Default)]
struct Clipped {
    text: String,
    cut: bool,
}

impl fmt::Write for Clipped {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = INPUT_LIMIT - self.text.len();
        if s.len() <= room {
            self.text.push_str(s);
            return Ok(());
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.text.push_str(&s[..end]);
        self.cut = true;
        Err(fmt::Error)
    }
}

/// A normalizer rejected its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("normalization failed: {0}")]
pub struct NormalizeError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_definition_message_names_attribute() {
        let err = DeclarationError::InvalidDefinition {
            attribute: "interests".into(),
            reason: "`integer` is a scalar type".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("`interests`"));
        assert!(msg.contains("must be a declared schema"));
    }

    #[test]
    fn test_conversion_error_truncates_long_input() {
        let long = "x".repeat(200);
        let err = ConversionError::new("integer", &long, "no numeric prefix");
        assert!(err.input.chars().count() <= 65);
        assert!(err.input.ends_with('…'));
    }

    #[test]
    fn test_conversion_error_keeps_short_input_whole() {
        let err = ConversionError::new("integer", "abc", "no numeric prefix");
        assert_eq!(err.input, "abc");
        let exact = "y".repeat(64);
        assert_eq!(ConversionError::new("integer", &exact, "x").input, exact);
    }

    #[test]
    fn test_conversion_error_truncation_respects_char_boundaries() {
        let long = "é".repeat(100);
        let err = ConversionError::new("integer", &long, "no numeric prefix");
        assert!(err.input.ends_with('…'));
    }
}
