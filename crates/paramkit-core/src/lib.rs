//! # paramkit-core — Foundational Types for paramkit
//!
//! This crate is the leaf of the paramkit workspace. It defines the value
//! model that raw input, coerced scalars and plain projections all share,
//! plus the built-in conversions every schema starts from.
//!
//! ## Key Design Principles
//!
//! 1. **One dynamic `Value` type.** Raw input (typically parsed JSON or YAML),
//!    coerced scalar values and the plain projection of an instance tree all
//!    use [`Value`]. Already-typed values (dates, decimals) can be handed in
//!    directly and pass through coercion untouched.
//!
//! 2. **Conversions signal, never panic.** Every built-in conversion returns
//!    `Result<Value, ConversionError>`. Turning a failure into a default is the
//!    descriptor's job, one crate up.
//!
//! 3. **Qualified keys are built, not concatenated.** [`KeyPath`] renders
//!    `post.sections[0].id` style keys so the bracket/dot rules live in one place.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `paramkit-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod path;
pub mod scalar;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{ConversionError, DeclarationError, NormalizeError};
pub use path::{KeyPath, Segment};
pub use scalar::BuiltinKind;
pub use value::{Map, Value, ValueKind};
