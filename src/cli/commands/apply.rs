//! Apply command
//!
//! Runs the `dme_config` module with a DME tree read from a JSON or YAML file.

use super::{module_params, read_document, CommandContext, EXIT_USAGE};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Arguments for the apply command
#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// File holding the DME tree (`-` for stdin)
    pub file: PathBuf,
}

impl ApplyArgs {
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let tree = match read_document(&self.file) {
            Ok(tree) => tree,
            Err(e) => {
                ctx.output.error("dme_config", &format!("{:#}", e));
                return Ok(EXIT_USAGE);
            }
        };

        ctx.run_module("dme_config", module_params([("config", Some(tree))]))
            .await
    }
}
