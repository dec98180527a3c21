//! # Coerce Subcommand
//!
//! Builds parameters from a document and prints `{"params": ...}`. Always
//! exits 0 once the schema and input load; coercion itself never fails.

use anyhow::Result;
use clap::Args;

use crate::{render, DocumentArgs};

/// Arguments for the coerce subcommand.
#[derive(Args, Debug)]
pub struct CoerceArgs {
    #[command(flatten)]
    pub document: DocumentArgs,
}

/// Coerced parameters as printed.
pub fn coerce_document(args: &CoerceArgs) -> Result<serde_json::Value> {
    let params = args.document.build()?;
    Ok(serde_json::json!({ "params": params.to_json() }))
}

/// Execute the coerce subcommand.
pub fn run_coerce(args: &CoerceArgs) -> Result<u8> {
    let output = coerce_document(args)?;
    println!("{}", render(&output, args.document.pretty)?);
    Ok(0)
}
