//! DME read module.
//!
//! Fetches the object model of a DME class (`/api/node/class/{entry}.json`)
//! and/or a single managed object (`/api/mo/{dn}.json`). Reads never change
//! the device.
//!
//! # Example
//!
//! ```yaml
//! - name: Read the physical interfaces and the BGP instance
//!   dme_command:
//!     read_class:
//!       entry: l1PhysIf
//!       rsp_prop_include: config-only
//!     read_dn:
//!       entry: sys/bgp
//!       rsp_subtree: full
//! ```

use crate::dme::{ClassQuery, DmeAddress, MoQuery};
use crate::modules::{
    block_on_module, Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult,
};
use serde::Deserialize;
use tracing::debug;

// ============================================================================
// Parameters
// ============================================================================

/// `read_class` suboptions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadClassArgs {
    pub entry: String,
    #[serde(default)]
    pub rsp_prop_include: Option<String>,
}

impl From<ReadClassArgs> for ClassQuery {
    fn from(args: ReadClassArgs) -> Self {
        ClassQuery {
            class_name: args.entry,
            rsp_prop_include: args.rsp_prop_include,
        }
    }
}

/// `read_dn` suboptions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadDnArgs {
    pub entry: String,
    #[serde(default)]
    pub rsp_prop_include: Option<String>,
    #[serde(default)]
    pub rsp_subtree: Option<String>,
    #[serde(default)]
    pub query_target: Option<String>,
    #[serde(default)]
    pub target_subtree_class: Option<String>,
}

impl From<ReadDnArgs> for MoQuery {
    fn from(args: ReadDnArgs) -> Self {
        MoQuery {
            dn: args.entry,
            rsp_prop_include: args.rsp_prop_include,
            rsp_subtree: args.rsp_subtree,
            query_target: args.query_target,
            target_subtree_class: args.target_subtree_class,
        }
    }
}

/// Parsed module parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DmeCommandConfig {
    pub read_class: Option<ClassQuery>,
    pub read_dn: Option<MoQuery>,
}

fn parse_suboptions<T: serde::de::DeserializeOwned>(
    params: &ModuleParams,
    key: &str,
) -> ModuleResult<Option<T>> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| ModuleError::InvalidParameter(format!("{}: {}", key, e))),
    }
}

impl DmeCommandConfig {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let read_class: Option<ReadClassArgs> = parse_suboptions(params, "read_class")?;
        let read_dn: Option<ReadDnArgs> = parse_suboptions(params, "read_dn")?;

        if read_class.is_none() && read_dn.is_none() {
            return Err(ModuleError::MissingParameter(
                "one of read_class or read_dn is required".to_string(),
            ));
        }

        Ok(Self {
            read_class: read_class.map(ClassQuery::from),
            read_dn: read_dn.map(MoQuery::from),
        })
    }
}

// ============================================================================
// Module Implementation
// ============================================================================

/// Read-only access to the DME object model
pub struct DmeCommandModule;

impl DmeCommandModule {
    async fn execute_async(
        config: DmeCommandConfig,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let client = context.client()?;
        let mut output = ModuleOutput::ok("DME object model retrieved");

        if let Some(query) = config.read_class {
            debug!(class = %query.class_name, "dme_command read_class");
            let body = client.read(&DmeAddress::Class(query)).await?;
            output = output.with_data("class", body);
        }

        if let Some(query) = config.read_dn {
            debug!(dn = %query.dn, "dme_command read_dn");
            let body = client.read(&DmeAddress::Mo(query)).await?;
            output = output.with_data("mo", body);
        }

        Ok(output)
    }
}

impl Module for DmeCommandModule {
    fn name(&self) -> &'static str {
        "dme_command"
    }

    fn description(&self) -> &'static str {
        "Fetch DME objects by class or distinguished name"
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        DmeCommandConfig::from_params(params).map(|_| ())
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let config = DmeCommandConfig::from_params(params)?;
        block_on_module(Self::execute_async(config, context))
    }
}
