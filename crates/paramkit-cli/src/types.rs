//! # Types Subcommand
//!
//! Lists the scalar kinds a registry knows and, for each declared schema,
//! its attributes with their kind labels:
//!
//! ```json
//! {"types": ["bool", "date", ...], "schemas": {"Post": {"id": "integer", "tags": "array of string"}}}
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use paramkit_schema::TypeRegistry;

use crate::{load_registry, render};

/// Arguments for the types subcommand.
#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Schema descriptor files to load first.
    #[arg(long = "schemas", value_name = "FILE", num_args = 1..)]
    pub schemas: Vec<PathBuf>,

    /// Pretty-print the output.
    #[arg(long)]
    pub pretty: bool,
}

/// The listing for `registry`.
pub fn describe(registry: &TypeRegistry) -> serde_json::Value {
    let schemas: serde_json::Map<String, serde_json::Value> = registry
        .schema_names()
        .into_iter()
        .filter_map(|name| {
            let schema = registry.schema(name)?;
            let attributes: serde_json::Map<String, serde_json::Value> = schema
                .attributes()
                .iter()
                .map(|a| (a.name.clone(), a.descriptor.kind_label().into()))
                .collect();
            Some((name.to_string(), attributes.into()))
        })
        .collect();
    serde_json::json!({
        "types": registry.type_names(),
        "schemas": schemas,
    })
}

/// Execute the types subcommand.
pub fn run_types(args: &TypesArgs) -> Result<u8> {
    let registry = load_registry(&args.schemas)?;
    println!("{}", render(&describe(&registry), args.pretty)?);
    Ok(0)
}
