//! # paramkit-cli — Command-Line Interface
//!
//! Provides the `paramkit` binary over the schema and rule crates.
//!
//! ## Subcommands
//!
//! - `paramkit coerce` — Build parameters from a document and print them.
//! - `paramkit validate` — Build, validate, and report qualified errors.
//! - `paramkit types` — List scalar types and declared schemas.
//!
//! ```bash
//! paramkit validate --schemas blog.yaml --schema Post --input post.json
//! paramkit coerce --schemas blog.yaml --schema Post --input - < post.json
//! paramkit types --schemas blog.yaml
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers return an exit code.
//! - Handlers delegate to the library crates and only format output.
//! - Documents print as JSON on stdout; logs go to stderr.

pub mod coerce;
pub mod types;
pub mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use paramkit_core::Value;
use paramkit_schema::{read_document, Capabilities, Instance, Schema, SchemaFile, Scope, TypeRegistry};

/// Arguments shared by every subcommand that processes a document.
#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// Schema descriptor files (YAML, or JSON by `.json` extension), loaded in order.
    #[arg(long = "schemas", value_name = "FILE", required = true, num_args = 1..)]
    pub schemas: Vec<PathBuf>,

    /// Name of the schema to build.
    #[arg(long)]
    pub schema: String,

    /// Input document; `-` reads JSON from stdin.
    #[arg(long, default_value = "-")]
    pub input: PathBuf,

    /// Capability granted to the scope. Repeatable.
    #[arg(long, value_name = "NAME")]
    pub grant: Vec<String>,

    /// Capability explicitly denied. Repeatable.
    #[arg(long, value_name = "NAME")]
    pub deny: Vec<String>,

    /// Pretty-print the output.
    #[arg(long)]
    pub pretty: bool,
}

impl DocumentArgs {
    /// Load every descriptor, read the input, and build the named schema.
    pub fn build(&self) -> Result<Instance> {
        let registry = load_registry(&self.schemas)?;
        let schema = lookup(&registry, &self.schema)?;
        let input = read_input(&self.input)?;
        let scope = scope_from_flags(&self.grant, &self.deny);
        tracing::debug!(schema = %self.schema, scoped = scope.is_some(), "building parameters");
        Ok(paramkit_schema::build_scoped(&schema, Some(&input), scope))
    }
}

/// A registry with the built-in kinds plus every schema the files declare.
pub fn load_registry(paths: &[PathBuf]) -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::with_builtins();
    for path in paths {
        let file = SchemaFile::from_path(path)?;
        let declared = file
            .declare(&mut registry)
            .with_context(|| format!("declaring schemas from {}", path.display()))?;
        tracing::info!(path = %path.display(), schemas = declared.len(), "loaded descriptor");
    }
    Ok(registry)
}

fn lookup(registry: &TypeRegistry, name: &str) -> Result<Arc<Schema>> {
    match registry.schema(name) {
        Some(schema) => Ok(Arc::clone(schema)),
        None => bail!(
            "no schema named '{name}' (declared: {})",
            registry.schema_names().join(", ")
        ),
    }
}

/// Read the input document from a file, or JSON from stdin for `-`.
pub fn read_input(path: &Path) -> Result<Value> {
    if path != Path::new("-") {
        return Ok(read_document(path)?);
    }
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("reading input from stdin")?;
    let json: serde_json::Value =
        serde_json::from_str(&text).context("parsing input from stdin as JSON")?;
    Ok(Value::from(json))
}

/// A capability scope from `--grant` / `--deny`, or none when both are empty.
/// A name given to both is denied.
pub fn scope_from_flags(grant: &[String], deny: &[String]) -> Option<Arc<dyn Scope>> {
    if grant.is_empty() && deny.is_empty() {
        return None;
    }
    let caps: Capabilities = grant
        .iter()
        .map(|name| (name.as_str(), true))
        .chain(deny.iter().map(|name| (name.as_str(), false)))
        .collect();
    Some(Arc::new(caps))
}

/// Serialize `value` for stdout.
pub fn render(value: &serde_json::Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
