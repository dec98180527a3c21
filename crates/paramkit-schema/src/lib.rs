//! # paramkit-schema — Typed Parameter Schemas
//!
//! Declares typed parameter objects, builds them from untyped nested input,
//! and reports validation failures keyed by nested path.
//!
//! ## Data Flow
//!
//! 1. **Declaration.** A [`SchemaBuilder`] borrows a [`TypeRegistry`] and
//!    accumulates attributes into a [`Schema`]. Declaration mistakes surface
//!    immediately as [`DeclarationError`].
//! 2. **Construction.** [`build`] applies a schema to a raw [`Value`] and
//!    returns an [`Instance`] tree. Construction never fails: input that
//!    cannot be converted resolves to the attribute default.
//! 3. **Validation.** A [`Validator`] runs a [`RuleEngine`] over every node of
//!    the tree and folds nested failures into qualified keys such as
//!    `sections[0].id`.
//!
//! ## Key Design Principles
//!
//! - Type descriptors are immutable. `with_default`, `with_normalize` and
//!   `of` return new descriptors, so built-in descriptors can be shared by
//!   any number of schemas.
//! - The registry is an explicit value, never a global. [`SharedRegistry`] is
//!   the lock-guarded form for programs that register types from several
//!   threads.
//! - Child instances reach ancestor context only through an explicit
//!   [`Scope`] handed in at construction time.
//!
//! ## Crate Policy
//!
//! - Depends only on `paramkit-core` internally.
//! - Never interprets rule options. Rule meaning belongs to the engine.

pub mod builder;
pub mod coerce;
pub mod descriptor;
pub mod instance;
pub mod loader;
pub mod registry;
pub mod rules;
pub mod schema;
pub mod scope;
pub mod validation;

pub use builder::{AttributeOptions, Definition, SchemaBuilder};
pub use coerce::{build, build_scoped};
pub use descriptor::{
    CollectionType, Converter, Normalizer, ScalarType, StructCollectionType, StructType,
    TypeDescriptor,
};
pub use instance::{AttributeValue, Collection, Instance, StructCollection};
pub use loader::{read_document, LoadError, SchemaFile};
pub use registry::{CustomType, SharedRegistry, TypeRegistry};
pub use rules::{AttributeError, NoRules, RuleContext, RuleEngine};
pub use schema::{Attribute, RuleSpec, Schema};
pub use scope::{Capabilities, Scope, ScopeChain};
pub use validation::{ValidationError, ValidationErrors, Validator};

pub use paramkit_core::{DeclarationError, Map, Value, ValueKind};
