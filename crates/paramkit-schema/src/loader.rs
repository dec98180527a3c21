//! # Schema Descriptor Files
//!
//! Declares schemas from YAML or JSON descriptor files, and loads raw input
//! documents. The format is chosen from the file extension: `.json` is read
//! as JSON, everything else as YAML.
//!
//! ```yaml
//! schemas:
//!   - name: Post
//!     attributes:
//!       - { name: id, type: integer, rules: { presence: true } }
//!       - { name: tags, type: array, of: string, default: [] }
//!       - { name: title, type: string, normalize: trim }
//!       - name: author
//!         type: struct
//!         attributes:
//!           - { name: name, type: string }
//!     validates:
//!       - { attributes: [id], rule: numericality, options: { greater_than: 0 } }
//! ```
//!
//! Schemas are declared in file order and defined in the registry under their
//! names, so a schema may reference (or `extends`) any schema declared before
//! it. A forward reference is a declaration error.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use paramkit_core::{DeclarationError, Map, Value};
use serde::Deserialize;
use thiserror::Error;

use crate::builder::{AttributeOptions, Definition, SchemaBuilder};
use crate::descriptor::Normalizer;
use crate::registry::TypeRegistry;
use crate::schema::{RuleSpec, Schema};

/// Error loading a descriptor file or input document.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid YAML/JSON or does not match the descriptor
    /// format.
    #[error("cannot parse {origin}: {reason}")]
    Parse {
        /// File path or `<inline>`.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// A schema declaration was rejected.
    #[error("schema '{schema}': {source}")]
    Declaration {
        /// Name of the schema being declared.
        schema: String,
        #[source]
        source: DeclarationError,
    },

    /// A `normalize` entry named no built-in normalizer.
    #[error("schema '{schema}': unknown normalizer `{name}` for attribute `{attribute}`")]
    UnknownNormalizer {
        /// Name of the schema being declared.
        schema: String,
        /// Attribute carrying the normalizer.
        attribute: String,
        /// The unrecognized normalizer name.
        name: String,
    },
}

// ─── Descriptor format ───────────────────────────────────────────────

/// A parsed descriptor file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaFile {
    #[serde(default)]
    pub schemas: Vec<SchemaDecl>,
}

/// One named schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDecl {
    pub name: String,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDecl>,
    #[serde(default)]
    pub validates: Vec<ValidatesDecl>,
}

/// One attribute declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDecl {
    pub name: String,
    /// Scalar kind name, `array`, `struct` (alias `has`) or `each`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Element kind of an `array`.
    #[serde(default)]
    pub of: Option<String>,
    /// Named schema of a `struct` or `each`.
    #[serde(default)]
    pub schema: Option<String>,
    /// Inline schema of a `struct` or `each`.
    #[serde(default)]
    pub attributes: Option<Vec<AttributeDecl>>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub normalize: Option<NormalizeDecl>,
    #[serde(default)]
    pub rules: BTreeMap<String, Value>,
}

/// One normalizer name, or several applied in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NormalizeDecl {
    One(String),
    Many(Vec<String>),
}

impl NormalizeDecl {
    fn names(&self) -> Vec<&str> {
        match self {
            NormalizeDecl::One(name) => vec![name.as_str()],
            NormalizeDecl::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// A schema-level rule binding.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatesDecl {
    pub attributes: Vec<String>,
    pub rule: String,
    #[serde(default)]
    pub options: Value,
}

// ─── Parsing ─────────────────────────────────────────────────────────

impl SchemaFile {
    pub fn parse_yaml(text: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(text).map_err(|e| LoadError::Parse {
            origin: "<inline>".to_string(),
            reason: format!("invalid YAML: {e}"),
        })
    }

    pub fn parse_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|e| LoadError::Parse {
            origin: "<inline>".to_string(),
            reason: format!("invalid JSON: {e}"),
        })
    }

    /// Read a descriptor file, choosing the format from its extension.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let content = read(path)?;
        let parsed = if is_json(path) {
            Self::parse_json(&content)
        } else {
            Self::parse_yaml(&content)
        };
        parsed.map_err(|e| match e {
            LoadError::Parse { reason, .. } => LoadError::Parse {
                origin: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    /// Declare every schema in file order and define each in `registry`.
    pub fn declare(&self, registry: &mut TypeRegistry) -> Result<Vec<Arc<Schema>>, LoadError> {
        let mut declared = Vec::with_capacity(self.schemas.len());
        for decl in &self.schemas {
            let schema = declare_schema(decl, registry)?;
            registry.define(decl.name.clone(), Arc::clone(&schema));
            declared.push(schema);
        }
        tracing::debug!(count = declared.len(), "declared schemas from descriptor");
        Ok(declared)
    }
}

/// Read a raw input document as a [`Value`].
pub fn read_document(path: &Path) -> Result<Value, LoadError> {
    let content = read(path)?;
    let origin = || path.display().to_string();
    if is_json(path) {
        serde_json::from_str::<serde_json::Value>(&content)
            .map(Value::from)
            .map_err(|e| LoadError::Parse {
                origin: origin(),
                reason: format!("invalid JSON: {e}"),
            })
    } else {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(&content).map_err(|e| LoadError::Parse {
                origin: origin(),
                reason: format!("invalid YAML: {e}"),
            })?;
        yaml_to_value(&yaml).map_err(|reason| LoadError::Parse {
            origin: origin(),
            reason,
        })
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Convert YAML to a [`Value`]. Scalar mapping keys are stringified.
fn yaml_to_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    use serde_yaml::Value as Yaml;
    match yaml {
        Yaml::Null => Ok(Value::Null),
        Yaml::Bool(b) => Ok(Value::Bool(*b)),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else {
                n.as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| format!("unrepresentable number {n}"))
            }
        }
        Yaml::String(s) => Ok(Value::String(s.clone())),
        Yaml::Sequence(items) => items
            .iter()
            .map(yaml_to_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Yaml::Mapping(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                let key = match k {
                    Yaml::String(s) => s.clone(),
                    Yaml::Bool(b) => b.to_string(),
                    Yaml::Number(n) => n.to_string(),
                    other => return Err(format!("unsupported mapping key {other:?}")),
                };
                out.insert(key, yaml_to_value(v)?);
            }
            Ok(Value::Map(out))
        }
        Yaml::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}

// ─── Declaration ─────────────────────────────────────────────────────

fn declare_schema(decl: &SchemaDecl, registry: &TypeRegistry) -> Result<Arc<Schema>, LoadError> {
    let in_schema = |source: DeclarationError| LoadError::Declaration {
        schema: decl.name.clone(),
        source,
    };
    let mut builder = match &decl.extends {
        Some(base) => {
            let base = registry.schema(base).ok_or_else(|| {
                in_schema(DeclarationError::InvalidDefinition {
                    attribute: decl.name.clone(),
                    reason: format!("cannot extend undefined schema `{base}`"),
                })
            })?;
            SchemaBuilder::derive(base, registry)
        }
        None => SchemaBuilder::new(registry),
    }
    .named(decl.name.clone());

    declare_attributes(&mut builder, &decl.name, &decl.attributes)?;
    for v in &decl.validates {
        let names: Vec<&str> = v.attributes.iter().map(String::as_str).collect();
        builder
            .validates(&names, RuleSpec::new(v.rule.clone(), v.options.clone()))
            .map_err(in_schema)?;
    }
    Ok(builder.build())
}

fn declare_attributes(
    builder: &mut SchemaBuilder<'_>,
    schema_name: &str,
    attributes: &[AttributeDecl],
) -> Result<(), LoadError> {
    for decl in attributes {
        declare_attribute(builder, schema_name, decl)?;
    }
    Ok(())
}

fn declare_attribute(
    builder: &mut SchemaBuilder<'_>,
    schema_name: &str,
    decl: &AttributeDecl,
) -> Result<(), LoadError> {
    let in_schema = |source: DeclarationError| LoadError::Declaration {
        schema: schema_name.to_string(),
        source,
    };
    let opts = attribute_options(schema_name, decl)?;
    let name = decl.name.as_str();
    match decl.kind.as_str() {
        "array" => {
            let of = decl.of.as_deref().ok_or_else(|| {
                in_schema(DeclarationError::MissingElementType {
                    attribute: name.to_string(),
                })
            })?;
            builder.collection_field(name, of, opts).map_err(in_schema)?;
        }
        kind @ ("struct" | "has" | "each") => {
            let definition = match (&decl.schema, &decl.attributes) {
                (Some(named), _) => Definition::Named(named.clone()),
                (None, Some(inline)) => {
                    let mut nested = SchemaBuilder::new(builder.registry());
                    declare_attributes(&mut nested, schema_name, inline)?;
                    Definition::Schema(nested.build())
                }
                (None, None) => {
                    return Err(in_schema(DeclarationError::InvalidDefinition {
                        attribute: name.to_string(),
                        reason: "requires `schema` or inline `attributes`".to_string(),
                    }))
                }
            };
            let result = if kind == "each" {
                builder.struct_collection_field(name, definition, opts)
            } else {
                builder.struct_field(name, definition, opts)
            };
            result.map_err(in_schema)?;
        }
        scalar => {
            builder.scalar(name, scalar, opts).map_err(in_schema)?;
        }
    }
    Ok(())
}

fn attribute_options(schema_name: &str, decl: &AttributeDecl) -> Result<AttributeOptions, LoadError> {
    let mut opts = AttributeOptions::default();
    if let Some(default) = &decl.default {
        opts = opts.with_default(default.clone());
    }
    if let Some(normalize) = &decl.normalize {
        let mut chain = Vec::new();
        for name in normalize.names() {
            let n = named_normalizer(name).ok_or_else(|| LoadError::UnknownNormalizer {
                schema: schema_name.to_string(),
                attribute: decl.name.clone(),
                name: name.to_string(),
            })?;
            chain.push(n);
        }
        opts = opts.with_normalizer(Normalizer::try_new(move |v| {
            chain.iter().try_fold(v, |acc, n| n.apply(acc))
        }));
    }
    for (rule, options) in &decl.rules {
        opts = opts.rule(rule.clone(), options.clone());
    }
    Ok(opts)
}

/// Built-in normalizers addressable by name from descriptor files.
///
/// `trim`, `downcase` and `upcase` act on strings (and on the string
/// elements of a sequence); `compact` drops nulls from sequences and
/// mappings. Other values pass through unchanged.
pub fn named_normalizer(name: &str) -> Option<Normalizer> {
    let text = |f: fn(&str) -> String| {
        Normalizer::new(move |v| map_text(v, f))
    };
    match name {
        "trim" => Some(text(|s| s.trim().to_string())),
        "downcase" => Some(text(str::to_lowercase)),
        "upcase" => Some(text(str::to_uppercase)),
        "compact" => Some(Normalizer::new(|v| match v {
            Value::List(items) => Value::List(items.into_iter().filter(|i| !i.is_null()).collect()),
            Value::Map(map) => Value::Map(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
            other => other,
        })),
        _ => None,
    }
}

fn map_text(value: Value, f: fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::List(items) => Value::List(items.into_iter().map(|i| map_text(i, f)).collect()),
        other => other,
    }
}
