//! Interfaces command
//!
//! Runs the `dme_interfaces` module. Wanted interfaces come from a JSON or
//! YAML list; `--name` narrows a gather to specific interfaces.

use super::{module_params, read_document, CommandContext, EXIT_USAGE};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde_json::json;
use std::path::PathBuf;

/// Desired interface state
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    /// Report current settings
    Gathered,
    /// Merge settings into existing interfaces
    Merged,
}

impl StateArg {
    fn as_str(self) -> &'static str {
        match self {
            StateArg::Gathered => "gathered",
            StateArg::Merged => "merged",
        }
    }
}

/// Arguments for the interfaces command
#[derive(Parser, Debug, Clone)]
pub struct InterfacesArgs {
    /// Desired state
    #[arg(long, value_enum, default_value = "gathered")]
    pub state: StateArg,

    /// File with the list of wanted interfaces
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Interface to gather (repeatable)
    #[arg(long = "name", action = clap::ArgAction::Append, conflicts_with = "config")]
    pub names: Vec<String>,

    /// Key existing interfaces by id or dn
    #[arg(long, default_value = "id")]
    pub key_by: String,
}

impl InterfacesArgs {
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let config = match &self.config {
            Some(path) => match read_document(path) {
                Ok(value) => Some(value),
                Err(e) => {
                    ctx.output.error("dme_interfaces", &format!("{:#}", e));
                    return Ok(EXIT_USAGE);
                }
            },
            None if !self.names.is_empty() => Some(json!(self
                .names
                .iter()
                .map(|name| json!({ "name": name }))
                .collect::<Vec<_>>())),
            None => None,
        };

        let params = module_params([
            ("state", Some(json!(self.state.as_str()))),
            ("config", config),
            ("key_by", Some(json!(self.key_by))),
        ]);

        ctx.run_module("dme_interfaces", params).await
    }
}
