//! Read commands
//!
//! `read-class` and `read-dn` run the `dme_command` module.

use super::{module_params, CommandContext};
use anyhow::Result;
use clap::Parser;
use serde_json::json;

/// Arguments for the read-class command
#[derive(Parser, Debug, Clone)]
pub struct ReadClassArgs {
    /// DME class name, e.g. l1PhysIf or ipv4aclACL
    pub entry: String,

    /// Restrict the returned properties (e.g. config-only)
    #[arg(long)]
    pub rsp_prop_include: Option<String>,
}

impl ReadClassArgs {
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let read_class = module_params([
            ("entry", Some(json!(self.entry))),
            ("rsp_prop_include", self.rsp_prop_include.as_ref().map(|v| json!(v))),
        ]);
        ctx.run_module("dme_command", module_params([("read_class", Some(json!(read_class)))]))
            .await
    }
}

/// Arguments for the read-dn command
#[derive(Parser, Debug, Clone)]
pub struct ReadDnArgs {
    /// Distinguished name, e.g. sys/intf/phys-[eth1/1]
    pub entry: String,

    /// Restrict the returned properties (e.g. config-only)
    #[arg(long)]
    pub rsp_prop_include: Option<String>,

    /// Include the object's subtree (e.g. full)
    #[arg(long)]
    pub rsp_subtree: Option<String>,

    /// Query scope (e.g. subtree)
    #[arg(long)]
    pub query_target: Option<String>,

    /// Only return subtree objects of this class
    #[arg(long)]
    pub target_subtree_class: Option<String>,
}

impl ReadDnArgs {
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let optional = |value: &Option<String>| value.as_ref().map(|v| json!(v));
        let read_dn = module_params([
            ("entry", Some(json!(self.entry))),
            ("rsp_prop_include", optional(&self.rsp_prop_include)),
            ("rsp_subtree", optional(&self.rsp_subtree)),
            ("query_target", optional(&self.query_target)),
            ("target_subtree_class", optional(&self.target_subtree_class)),
        ]);
        ctx.run_module("dme_command", module_params([("read_dn", Some(json!(read_dn)))]))
            .await
    }
}
