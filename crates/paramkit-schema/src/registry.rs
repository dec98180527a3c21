//! # Type Registry
//!
//! Maps type names to scalar descriptors and to named struct schemas. The
//! registry is the ambient context of every declaration: a
//! [`SchemaBuilder`](crate::SchemaBuilder) borrows one and resolves type names
//! through it at declaration time.
//!
//! Changes are never retroactive. A schema keeps the descriptor it resolved
//! when it was declared, even if the name is later re-registered or removed.
//!
//! [`SharedRegistry`] wraps a registry in a single-writer lock for programs
//! that register types from several threads.

use std::collections::HashMap;
use std::sync::Arc;

use paramkit_core::{BuiltinKind, DeclarationError, Value, ValueKind};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::descriptor::{Converter, ScalarType};
use crate::schema::Schema;

/// Registration parameters for a custom scalar kind.
#[derive(Debug, Clone, Default)]
pub struct CustomType {
    convert: Option<Converter>,
    default: Option<Value>,
    target: Option<ValueKind>,
}

impl CustomType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversion from raw input. Required.
    pub fn convert<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, paramkit_core::ConversionError> + Send + Sync + 'static,
    {
        self.convert = Some(Converter::new(f));
        self
    }

    /// Default value for attributes declared with this kind.
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Representation that passes through without conversion.
    pub fn target(mut self, target: ValueKind) -> Self {
        self.target = Some(target);
        self
    }
}

/// Name → descriptor table for scalar kinds and named struct schemas.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    scalars: HashMap<String, ScalarType>,
    schemas: HashMap<String, Arc<Schema>>,
}

impl TypeRegistry {
    /// A registry with no types at all.
    pub fn empty() -> Self {
        Self {
            scalars: HashMap::new(),
            schemas: HashMap::new(),
        }
    }

    /// A registry holding the eight built-in scalar kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for kind in BuiltinKind::ALL {
            registry
                .scalars
                .insert(kind.name().to_string(), ScalarType::builtin(kind));
        }
        registry
    }

    /// Register a custom scalar kind, replacing any previous kind of that name.
    ///
    /// # Errors
    ///
    /// [`DeclarationError::MissingConverter`] when `custom` has no conversion.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        custom: CustomType,
    ) -> Result<(), DeclarationError> {
        let name = name.into();
        let Some(convert) = custom.convert else {
            return Err(DeclarationError::MissingConverter { type_name: name });
        };
        let mut scalar = ScalarType::custom(name.clone(), convert);
        if let Some(target) = custom.target {
            scalar = scalar.with_target(target);
        }
        if let Some(default) = custom.default {
            scalar = scalar.with_default(default);
        }
        self.register_scalar(name, scalar);
        Ok(())
    }

    /// Install an already-built scalar descriptor under `name`.
    pub fn register_scalar(&mut self, name: impl Into<String>, scalar: ScalarType) {
        let name = name.into();
        let replaced = self.scalars.insert(name.clone(), scalar).is_some();
        tracing::debug!(type_name = %name, replaced, "registered scalar type");
    }

    /// Remove a scalar kind. Returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.scalars.remove(name).is_some();
        if removed {
            tracing::debug!(type_name = %name, "unregistered scalar type");
        }
        removed
    }

    pub fn scalar(&self, name: &str) -> Option<&ScalarType> {
        self.scalars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scalars.contains_key(name)
    }

    /// Registered scalar kind names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.scalars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Define a named struct kind usable as a [`Definition`](crate::Definition).
    pub fn define(&mut self, name: impl Into<String>, schema: Arc<Schema>) {
        let name = name.into();
        tracing::debug!(schema = %name, attributes = schema.len(), "defined schema");
        self.schemas.insert(name, schema);
    }

    pub fn schema(&self, name: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(name)
    }

    /// Defined schema names, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

// ─── Shared registry ─────────────────────────────────────────────────

/// A registry behind a single-writer lock.
///
/// Declarations hold a read guard for their duration; registrations take the
/// write guard. Cloning shares the same underlying registry.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry(Arc<RwLock<TypeRegistry>>);

impl SharedRegistry {
    pub fn new(registry: TypeRegistry) -> Self {
        Self(Arc::new(RwLock::new(registry)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.0.write()
    }

    /// Copy of the current registry state.
    pub fn snapshot(&self) -> TypeRegistry {
        self.0.read().clone()
    }

    /// Replace the registry state with `snapshot`.
    pub fn restore(&self, snapshot: TypeRegistry) {
        *self.0.write() = snapshot;
    }
}
