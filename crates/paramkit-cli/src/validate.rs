//! # Validate Subcommand
//!
//! Builds parameters, runs the standard rule engine over the whole tree,
//! and prints a report:
//!
//! ```json
//! {"params": {...}, "valid": false, "errors": [{"key": "sections[0].id", "message": "can't be blank"}]}
//! ```
//!
//! Exit code 0 when valid, 1 when not.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use paramkit_rules::StandardRules;
use paramkit_schema::ValidationErrors;

use crate::{render, DocumentArgs};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub document: DocumentArgs,

    /// Also print each error as a sentence under `messages`.
    #[arg(long)]
    pub full_messages: bool,
}

/// Outcome of validating one document.
#[derive(Debug, Serialize)]
pub struct Report {
    pub params: serde_json::Value,
    pub valid: bool,
    pub errors: ValidationErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<String>>,
}

pub fn validate_document(args: &ValidateArgs) -> Result<Report> {
    let params = args.document.build()?;
    let errors = params.errors(&StandardRules::new());
    let messages = args.full_messages.then(|| errors.full_messages());
    Ok(Report {
        params: params.to_json(),
        valid: errors.is_empty(),
        errors,
        messages,
    })
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let report = validate_document(args)?;
    if !report.valid {
        tracing::info!(errors = report.errors.len(), "document is invalid");
    }
    println!("{}", render(&serde_json::to_value(&report)?, args.document.pretty)?);
    Ok(if report.valid { 0 } else { 1 })
}
