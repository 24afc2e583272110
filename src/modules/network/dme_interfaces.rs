//! Physical interface resource module.
//!
//! Reads the `l1PhysIf` objects of the device and either reports them in
//! canonical form (`gathered`) or merges the wanted interface settings into
//! them (`merged`). Merging only touches interfaces that already exist and
//! whose attributes actually differ.
//!
//! # Example
//!
//! ```yaml
//! - name: Describe and enable uplinks
//!   dme_interfaces:
//!     state: merged
//!     config:
//!       - name: Ethernet1/1
//!         description: to-core-1
//!         enabled: true
//!       - name: eth1/2
//!         mtu: "9216"
//! ```

use super::common::{find_object_by_key, interface_type, normalize_interface, InterfaceType};
use crate::dme::interfaces::{extract_class_objects, resolve_interface_name, L1_PHYS_IF};
use crate::dme::{ClassQuery, DmeAddress, InterfaceConfig, InterfaceKey, InterfaceModelMapper};
use crate::modules::{
    block_on_module, Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult,
    ParamExt,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

// ============================================================================
// Parameters
// ============================================================================

/// Desired end state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterfaceState {
    /// Merge the given attributes into existing interfaces
    #[default]
    Merged,
    /// Report the current configuration only
    Gathered,
}

impl InterfaceState {
    fn from_str(s: &str) -> ModuleResult<Self> {
        match s.to_lowercase().as_str() {
            "merged" => Ok(InterfaceState::Merged),
            "gathered" => Ok(InterfaceState::Gathered),
            _ => Err(ModuleError::InvalidParameter(format!(
                "Invalid state '{}'. Valid options: merged, gathered",
                s
            ))),
        }
    }
}

/// Parsed module parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DmeInterfacesConfig {
    pub state: InterfaceState,
    /// Wanted interfaces, names normalised
    pub config: Vec<InterfaceConfig>,
    pub key_by: InterfaceKey,
}

impl DmeInterfacesConfig {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let state = match params.get_string("state")? {
            Some(s) => InterfaceState::from_str(&s)?,
            None => InterfaceState::default(),
        };

        let key_by = match params.get_string("key_by")? {
            Some(s) => s.parse::<InterfaceKey>()?,
            None => InterfaceKey::default(),
        };

        let mut config: Vec<InterfaceConfig> = match params.get("config") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ModuleError::InvalidParameter(format!("config: {}", e)))?,
        };
        for interface in &mut config {
            interface.name = normalize_interface(&interface.name);
        }

        if state == InterfaceState::Merged {
            if config.is_empty() {
                return Err(ModuleError::MissingParameter(
                    "config is required when state is merged".to_string(),
                ));
            }
            if let Some(other) = config
                .iter()
                .find(|i| interface_type(&i.name) != InterfaceType::Ethernet)
            {
                return Err(ModuleError::InvalidParameter(format!(
                    "{} is a {} interface; only Ethernet interfaces can be merged",
                    other.name,
                    interface_type(&other.name)
                )));
            }
        }

        Ok(Self {
            state,
            config,
            key_by,
        })
    }
}

// ============================================================================
// Module Implementation
// ============================================================================

/// Manage NX-OS physical interfaces through the DME
pub struct DmeInterfacesModule;

impl DmeInterfacesModule {
    fn gather_query() -> DmeAddress {
        DmeAddress::Class(ClassQuery::new(L1_PHYS_IF).with_rsp_prop_include("config-only"))
    }

    /// Canonical form of the existing interface with the given name.
    fn existing(objects: &[Value], name: &str) -> ModuleResult<Option<InterfaceConfig>> {
        match find_object_by_key(objects, "id", &resolve_interface_name(name)) {
            Some((attrs, _)) => Ok(Some(InterfaceModelMapper::from_dme(attrs)?)),
            None => Ok(None),
        }
    }

    fn gathered(config: &DmeInterfacesConfig, have: &[Map<String, Value>]) -> ModuleResult<Value> {
        let objects: Vec<Value> = have.iter().cloned().map(Value::Object).collect();

        let interfaces = if config.config.is_empty() {
            have.iter()
                .map(InterfaceModelMapper::from_dme)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let mut found = Vec::new();
            for wanted in &config.config {
                if let Some(existing) = Self::existing(&objects, &wanted.name)? {
                    found.push(existing);
                }
            }
            found
        };

        Ok(serde_json::to_value(interfaces).map_err(crate::error::Error::from)?)
    }

    async fn execute_async(
        config: DmeInterfacesConfig,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let client = context.client()?;
        let body = client.read(&Self::gather_query()).await?;
        let have = extract_class_objects(&body, L1_PHYS_IF);
        debug!(interfaces = have.len(), "gathered l1PhysIf objects");

        if config.state == InterfaceState::Gathered {
            let gathered = Self::gathered(&config, &have)?;
            return Ok(ModuleOutput::ok("Interface configuration gathered")
                .with_data("gathered", gathered));
        }

        let mapper = InterfaceModelMapper::new(config.key_by);
        let plan = mapper.plan_merge(&config.config, &mapper.index(&have));

        for name in &plan.missing {
            warn!(interface = %name, "interface does not exist on the device, skipping");
        }

        let summary = |output: ModuleOutput| {
            output
                .with_data("unchanged", serde_json::json!(plan.unchanged))
                .with_data("missing", serde_json::json!(plan.missing))
        };

        if !plan.has_changes() {
            return Ok(summary(ModuleOutput::ok(
                "Interfaces already in the desired state",
            )));
        }

        let objects: Vec<Value> = have.into_iter().map(Value::Object).collect();
        let mut before = Vec::new();
        for name in &plan.changed {
            if let Some(existing) = Self::existing(&objects, name)? {
                before.push(existing);
            }
        }

        let commands = serde_json::json!([plan.request]);
        let before = serde_json::to_value(before).map_err(crate::error::Error::from)?;

        if context.check_mode {
            return Ok(summary(
                ModuleOutput::changed(format!("Would update {} interfaces", plan.changed.len()))
                    .with_data("changed_interfaces", serde_json::json!(plan.changed))
                    .with_data("commands", commands)
                    .with_data("before", before),
            ));
        }

        let outcome = client.configure(&plan.request).await?;
        Ok(summary(
            ModuleOutput::changed(format!("Updated {} interfaces", plan.changed.len()))
                .with_data("changed_interfaces", serde_json::json!(plan.changed))
                .with_data("commands", commands)
                .with_data("before", before)
                .with_data("dme_response", outcome.dme_response),
        ))
    }
}

impl Module for DmeInterfacesModule {
    fn name(&self) -> &'static str {
        "dme_interfaces"
    }

    fn description(&self) -> &'static str {
        "Manage NX-OS physical interface attributes through the DME"
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        DmeInterfacesConfig::from_params(params).map(|_| ())
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let config = DmeInterfacesConfig::from_params(params)?;
        block_on_module(Self::execute_async(config, context))
    }
}
