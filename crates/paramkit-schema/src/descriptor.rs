//! # Type Descriptor Algebra
//!
//! A [`TypeDescriptor`] describes how one attribute's raw input is normalized,
//! converted and defaulted. There are four closed variants:
//!
//! | Variant | Coerces to |
//! |---------|-----------|
//! | [`ScalarType`] | a single [`Value`] |
//! | [`CollectionType`] | a [`Collection`] of scalar values |
//! | [`StructType`] | an optional nested [`Instance`] |
//! | [`StructCollectionType`] | a [`StructCollection`] of nested instances |
//!
//! ## Immutability
//!
//! Descriptors are values. `with_default`, `with_normalize` and `of` return a
//! new descriptor and leave the receiver untouched, so the registry's built-in
//! descriptors can be handed to every schema that declares them. Closures sit
//! behind `Arc`, which keeps cloning cheap.
//!
//! ## Failure Policy
//!
//! `coerce` never returns an error. A failed normalizer or conversion falls
//! back to the descriptor's default (or `Null`), and the fallback is logged at
//! `trace` level.

use std::fmt;
use std::sync::Arc;

use paramkit_core::{BuiltinKind, ConversionError, NormalizeError, Value, ValueKind};

use crate::coerce::build_scoped;
use crate::instance::{AttributeValue, Collection, Instance, StructCollection};
use crate::schema::Schema;
use crate::scope::Scope;

type NormalizeFn = dyn Fn(Value) -> Result<Value, NormalizeError> + Send + Sync;
type ConvertFn = dyn Fn(&Value) -> Result<Value, ConversionError> + Send + Sync;

// ─── Closures ────────────────────────────────────────────────────────

/// A transform applied to raw input before conversion.
#[derive(Clone)]
pub struct Normalizer(Arc<NormalizeFn>);

impl Normalizer {
    /// Wrap an infallible transform.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(move |v| Ok(f(v))))
    }

    /// Wrap a transform that may reject its input.
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Result<Value, NormalizeError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn apply(&self, value: Value) -> Result<Value, NormalizeError> {
        (self.0)(value)
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Normalizer(..)")
    }
}

/// A scalar conversion function.
#[derive(Clone)]
pub struct Converter(Arc<ConvertFn>);

impl Converter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ConversionError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// The conversion of a built-in kind.
    pub fn builtin(kind: BuiltinKind) -> Self {
        Self::new(move |v| kind.convert(v))
    }

    pub fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        (self.0)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converter(..)")
    }
}

// ─── Scalar ──────────────────────────────────────────────────────────

/// A single converted value.
#[derive(Debug, Clone)]
pub struct ScalarType {
    name: String,
    target: Option<ValueKind>,
    convert: Converter,
    default: Option<Value>,
    normalize: Option<Normalizer>,
}

impl ScalarType {
    /// Descriptor for a built-in kind. Values already of the kind's target
    /// representation pass through without conversion.
    pub fn builtin(kind: BuiltinKind) -> Self {
        Self {
            name: kind.name().to_string(),
            target: Some(kind.target()),
            convert: Converter::builtin(kind),
            default: None,
            normalize: None,
        }
    }

    /// Descriptor for a custom kind. Without a target representation every
    /// non-null value goes through `convert`.
    pub fn custom(name: impl Into<String>, convert: Converter) -> Self {
        Self {
            name: name.into(),
            target: None,
            convert,
            default: None,
            normalize: None,
        }
    }

    /// Declare the representation that passes through unconverted.
    pub fn with_target(&self, target: ValueKind) -> Self {
        Self {
            target: Some(target),
            ..self.clone()
        }
    }

    pub fn with_default(&self, default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            ..self.clone()
        }
    }

    pub fn with_normalize(&self, normalize: Normalizer) -> Self {
        Self {
            normalize: Some(normalize),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Option<ValueKind> {
        self.target
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_normalizer(&self) -> bool {
        self.normalize.is_some()
    }

    fn fallback(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }

    /// Normalize, default and convert one raw value.
    pub fn coerce(&self, raw: &Value) -> Value {
        let value = match &self.normalize {
            Some(n) => match n.apply(raw.clone()) {
                Ok(v) => v,
                Err(e) => {
                    tracing::trace!(kind = %self.name, error = %e, "normalizer failed, using default");
                    return self.fallback();
                }
            },
            None => raw.clone(),
        };
        if value.is_null() {
            return self.fallback();
        }
        if self.target == Some(value.kind()) {
            return value;
        }
        match self.convert.convert(&value) {
            Ok(v) => v,
            Err(e) => {
                tracing::trace!(kind = %self.name, error = %e, "conversion failed, using default");
                self.fallback()
            }
        }
    }
}

// ─── Collections ─────────────────────────────────────────────────────

/// A homogeneous sequence of scalars.
#[derive(Debug, Clone, Default)]
pub struct CollectionType {
    element: Option<ScalarType>,
    default: Option<Value>,
    normalize: Option<Normalizer>,
}

impl CollectionType {
    /// A collection whose elements pass through unchanged until [`of`](Self::of)
    /// sets an element type.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(&self, element: ScalarType) -> Self {
        Self {
            element: Some(element),
            ..self.clone()
        }
    }

    pub fn with_default(&self, default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            ..self.clone()
        }
    }

    pub fn with_normalize(&self, normalize: Normalizer) -> Self {
        Self {
            normalize: Some(normalize),
            ..self.clone()
        }
    }

    pub fn element(&self) -> Option<&ScalarType> {
        self.element.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn coerce(&self, raw: &Value) -> Collection {
        let input = or_default(raw, self.default.as_ref());
        let input = normalized(&input, self.normalize.as_ref(), "array");
        let items = sequence(input, self.default.as_ref())
            .into_iter()
            .map(|item| match &self.element {
                Some(element) => element.coerce(&item),
                None => item,
            })
            .collect();
        Collection::new(items)
    }
}

/// A sequence of nested instances sharing one schema.
#[derive(Debug, Clone)]
pub struct StructCollectionType {
    schema: Arc<Schema>,
    default: Option<Value>,
    normalize: Option<Normalizer>,
}

impl StructCollectionType {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            default: None,
            normalize: None,
        }
    }

    pub fn of(&self, schema: Arc<Schema>) -> Self {
        Self {
            schema,
            ..self.clone()
        }
    }

    pub fn with_default(&self, default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            ..self.clone()
        }
    }

    pub fn with_normalize(&self, normalize: Normalizer) -> Self {
        Self {
            normalize: Some(normalize),
            ..self.clone()
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn coerce(&self, raw: &Value) -> StructCollection {
        self.coerce_in(raw, None)
    }

    pub(crate) fn coerce_in(&self, raw: &Value, scope: Option<&Arc<dyn Scope>>) -> StructCollection {
        let input = or_default(raw, self.default.as_ref());
        let input = normalized(&input, self.normalize.as_ref(), "each");
        let items = sequence(input, self.default.as_ref())
            .into_iter()
            .map(|item| build_scoped(&self.schema, Some(&item), scope.cloned()))
            .collect();
        StructCollection::new(items)
    }
}

// ─── Struct ──────────────────────────────────────────────────────────

/// A single nested instance.
#[derive(Debug, Clone)]
pub struct StructType {
    schema: Arc<Schema>,
    default: Option<Value>,
    normalize: Option<Normalizer>,
}

impl StructType {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            default: None,
            normalize: None,
        }
    }

    pub fn with_default(&self, default: impl Into<Value>) -> Self {
        Self {
            default: Some(default.into()),
            ..self.clone()
        }
    }

    pub fn with_normalize(&self, normalize: Normalizer) -> Self {
        Self {
            normalize: Some(normalize),
            ..self.clone()
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// `None` for null input with no default; a nested instance otherwise.
    /// Present input that is not a mapping builds from an empty mapping.
    pub fn coerce(&self, raw: &Value) -> Option<Instance> {
        self.coerce_in(raw, None)
    }

    pub(crate) fn coerce_in(&self, raw: &Value, scope: Option<&Arc<dyn Scope>>) -> Option<Instance> {
        let input = or_default(raw, self.default.as_ref());
        let source = match normalized(&input, self.normalize.as_ref(), "has") {
            Value::Null => self.default.clone().filter(|d| !d.is_null())?,
            other => other,
        };
        Some(build_scoped(&self.schema, Some(&source), scope.cloned()))
    }
}

// ─── Shared helpers ──────────────────────────────────────────────────

/// Null input takes the default before any normalizer runs.
fn or_default(raw: &Value, default: Option<&Value>) -> Value {
    match (raw, default) {
        (Value::Null, Some(default)) => default.clone(),
        _ => raw.clone(),
    }
}

/// Run an optional whole-input normalizer. Null input skips it; failure
/// reads as null.
fn normalized(raw: &Value, normalize: Option<&Normalizer>, kind: &str) -> Value {
    match normalize {
        Some(n) if !raw.is_null() => n.apply(raw.clone()).unwrap_or_else(|e| {
            tracing::trace!(kind, error = %e, "normalizer failed, using default");
            Value::Null
        }),
        _ => raw.clone(),
    }
}

/// Shape input into a sequence: null takes the default (or empty), lists pass
/// through, mappings become `[key, value]` pairs in sorted key order, scalars
/// are wrapped.
fn sequence(input: Value, default: Option<&Value>) -> Vec<Value> {
    let input = match input {
        Value::Null => match default {
            Some(d) => d.clone(),
            None => return Vec::new(),
        },
        other => other,
    };
    match input {
        Value::Null => Vec::new(),
        Value::List(items) => items,
        Value::Map(map) => map
            .into_iter()
            .map(|(k, v)| Value::List(vec![Value::String(k), v]))
            .collect(),
        scalar => vec![scalar],
    }
}

// ─── Descriptor ──────────────────────────────────────────────────────

/// The closed set of attribute type descriptors.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    Scalar(ScalarType),
    Collection(CollectionType),
    Struct(StructType),
    StructCollection(StructCollectionType),
}

impl TypeDescriptor {
    pub fn with_default(&self, default: impl Into<Value>) -> Self {
        match self {
            TypeDescriptor::Scalar(t) => TypeDescriptor::Scalar(t.with_default(default)),
            TypeDescriptor::Collection(t) => TypeDescriptor::Collection(t.with_default(default)),
            TypeDescriptor::Struct(t) => TypeDescriptor::Struct(t.with_default(default)),
            TypeDescriptor::StructCollection(t) => {
                TypeDescriptor::StructCollection(t.with_default(default))
            }
        }
    }

    pub fn with_normalize(&self, normalize: Normalizer) -> Self {
        match self {
            TypeDescriptor::Scalar(t) => TypeDescriptor::Scalar(t.with_normalize(normalize)),
            TypeDescriptor::Collection(t) => {
                TypeDescriptor::Collection(t.with_normalize(normalize))
            }
            TypeDescriptor::Struct(t) => TypeDescriptor::Struct(t.with_normalize(normalize)),
            TypeDescriptor::StructCollection(t) => {
                TypeDescriptor::StructCollection(t.with_normalize(normalize))
            }
        }
    }

    pub fn default_value(&self) -> Option<&Value> {
        match self {
            TypeDescriptor::Scalar(t) => t.default_value(),
            TypeDescriptor::Collection(t) => t.default_value(),
            TypeDescriptor::Struct(t) => t.default_value(),
            TypeDescriptor::StructCollection(t) => t.default_value(),
        }
    }

    fn normalizer(&self) -> Option<&Normalizer> {
        match self {
            TypeDescriptor::Scalar(t) => t.normalize.as_ref(),
            TypeDescriptor::Collection(t) => t.normalize.as_ref(),
            TypeDescriptor::Struct(t) => t.normalize.as_ref(),
            TypeDescriptor::StructCollection(t) => t.normalize.as_ref(),
        }
    }

    /// Carry this descriptor's default and normalizer over to `replacement`.
    pub(crate) fn carry_settings_to(&self, replacement: TypeDescriptor) -> TypeDescriptor {
        let mut next = replacement;
        if let Some(d) = self.default_value() {
            next = next.with_default(d.clone());
        }
        if let Some(n) = self.normalizer() {
            next = next.with_normalize(n.clone());
        }
        next
    }

    /// The nested schema of struct-valued descriptors.
    pub fn nested_schema(&self) -> Option<&Arc<Schema>> {
        match self {
            TypeDescriptor::Struct(t) => Some(t.schema()),
            TypeDescriptor::StructCollection(t) => Some(t.schema()),
            _ => None,
        }
    }

    /// Short kind label used in listings.
    pub fn kind_label(&self) -> String {
        match self {
            TypeDescriptor::Scalar(t) => t.name().to_string(),
            TypeDescriptor::Collection(t) => match t.element() {
                Some(e) => format!("array of {}", e.name()),
                None => "array".to_string(),
            },
            TypeDescriptor::Struct(_) => "has".to_string(),
            TypeDescriptor::StructCollection(_) => "each".to_string(),
        }
    }

    /// Coerce without a scope.
    pub fn coerce(&self, raw: &Value) -> AttributeValue {
        self.coerce_in(raw, None)
    }

    pub(crate) fn coerce_in(&self, raw: &Value, scope: Option<&Arc<dyn Scope>>) -> AttributeValue {
        match self {
            TypeDescriptor::Scalar(t) => AttributeValue::Scalar(t.coerce(raw)),
            TypeDescriptor::Collection(t) => AttributeValue::Collection(t.coerce(raw)),
            TypeDescriptor::Struct(t) => AttributeValue::Struct(t.coerce_in(raw, scope)),
            TypeDescriptor::StructCollection(t) => {
                AttributeValue::StructCollection(t.coerce_in(raw, scope))
            }
        }
    }
}

impl From<ScalarType> for TypeDescriptor {
    fn from(t: ScalarType) -> Self {
        TypeDescriptor::Scalar(t)
    }
}

impl From<CollectionType> for TypeDescriptor {
    fn from(t: CollectionType) -> Self {
        TypeDescriptor::Collection(t)
    }
}

impl From<StructType> for TypeDescriptor {
    fn from(t: StructType) -> Self {
        TypeDescriptor::Struct(t)
    }
}

impl From<StructCollectionType> for TypeDescriptor {
    fn from(t: StructCollectionType) -> Self {
        TypeDescriptor::StructCollection(t)
    }
}
