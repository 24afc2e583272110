//! Validate command
//!
//! Runs the `dme_validate` module. Start id and error correlation default to
//! the `validation` section of the configuration file.

use super::{module_params, CommandContext};
use anyhow::Result;
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;

/// Arguments for the validate command
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// File with the configuration to validate
    #[arg(long, conflicts_with = "lines")]
    pub src: Option<PathBuf>,

    /// Configuration line (repeatable)
    #[arg(long = "line", action = clap::ArgAction::Append)]
    pub lines: Vec<String>,

    /// Parent line placed before the lines (repeatable)
    #[arg(long = "parent", action = clap::ArgAction::Append)]
    pub parents: Vec<String>,

    /// Line sent before everything else (repeatable)
    #[arg(long, action = clap::ArgAction::Append)]
    pub before: Vec<String>,

    /// Line sent after everything else (repeatable)
    #[arg(long, action = clap::ArgAction::Append)]
    pub after: Vec<String>,

    /// JSON-RPC id of the first command
    #[arg(long)]
    pub start_id: Option<u64>,

    /// Match rejected commands by position or by id
    #[arg(long)]
    pub correlate_by: Option<String>,
}

impl ValidateArgs {
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let list = |values: &Vec<String>| (!values.is_empty()).then(|| json!(values));
        let validation = &ctx.config.validation;

        let params = module_params([
            ("src", self.src.as_ref().map(|p| json!(p.to_string_lossy()))),
            ("lines", list(&self.lines)),
            ("parents", list(&self.parents)),
            ("before", list(&self.before)),
            ("after", list(&self.after)),
            ("start_id", Some(json!(self.start_id.unwrap_or(validation.start_id)))),
            (
                "correlate_by",
                Some(json!(self
                    .correlate_by
                    .clone()
                    .unwrap_or_else(|| validation.correlate_by.clone()))),
            ),
        ]);

        ctx.run_module("dme_validate", params).await
    }
}
