//! DME validation module.
//!
//! Sends NX-OS CLI configuration to the device's JSON-RPC endpoint as a
//! `cli_rest` batch. The device answers with the DME model the commands would
//! produce and flags every command it rejects. Nothing is applied, so the
//! module never reports a change.
//!
//! # Example
//!
//! ```yaml
//! - name: Validate an interface block
//!   dme_validate:
//!     parents: interface Ethernet1/1
//!     lines:
//!       - description uplink
//!       - no shutdown
//!   register: result
//!
//! - name: Apply what the device accepted
//!   dme_config:
//!     config: "{{ result.model }}"
//!   when: result.valid
//! ```

use crate::dme::jsonrpc::DEFAULT_START_ID;
use crate::dme::{ConfigSections, CorrelateBy, ValidateRequest};
use crate::modules::{
    block_on_module, Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult,
    ParamExt,
};
use std::path::PathBuf;
use tracing::debug;

// ============================================================================
// Parameters
// ============================================================================

/// Parsed module parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DmeValidateConfig {
    /// Inline configuration groups
    pub sections: ConfigSections,
    /// File holding the configuration text
    pub src: Option<PathBuf>,
    /// JSON-RPC id of the first command
    pub start_id: u64,
    /// How rejected commands are matched to the submitted ones
    pub correlate_by: CorrelateBy,
}

impl DmeValidateConfig {
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let sections = ConfigSections::new()
            .with_before(params.get_lines("before")?.unwrap_or_default())
            .with_parents(params.get_lines("parents")?.unwrap_or_default())
            .with_lines(params.get_lines("lines")?.unwrap_or_default())
            .with_after(params.get_lines("after")?.unwrap_or_default());

        let src = params.get_string("src")?.map(PathBuf::from);
        if src.is_some() && !sections.lines.is_empty() {
            return Err(ModuleError::InvalidParameter(
                "lines and src are mutually exclusive".to_string(),
            ));
        }

        let start_id = params.get_u64("start_id")?.unwrap_or(DEFAULT_START_ID);

        let correlate_by = match params.get_string("correlate_by")? {
            Some(value) => value.parse::<CorrelateBy>()?,
            None => CorrelateBy::default(),
        };

        Ok(Self {
            sections,
            src,
            start_id,
            correlate_by,
        })
    }

    /// True when there is something to send to the device.
    pub fn has_input(&self) -> bool {
        self.src.is_some() || !self.sections.lines.is_empty()
    }

    /// Build the validation request, reading `src` if set.
    pub fn to_request(&self) -> ModuleResult<ValidateRequest> {
        let request = match &self.src {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    ModuleError::ExecutionFailed(format!(
                        "Failed to read source file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                ValidateRequest::from_text(&text)
            }
            None => ValidateRequest::from_sections(&self.sections),
        };

        Ok(request
            .with_start_id(self.start_id)
            .with_correlate_by(self.correlate_by))
    }
}

// ============================================================================
// Module Implementation
// ============================================================================

/// Validate CLI configuration against the device's DME
pub struct DmeValidateModule;

impl DmeValidateModule {
    async fn execute_async(
        request: ValidateRequest,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let client = context.client()?;
        debug!(commands = request.commands.len(), "dme_validate");

        let outcome = client.validate(&request).await?;

        let msg = if outcome.is_valid() {
            format!("{} configuration commands validated", request.commands.len())
        } else {
            format!(
                "Device rejected {} of {} configuration commands",
                outcome.errors.len(),
                request.commands.len()
            )
        };

        let mut output = ModuleOutput::ok(msg)
            .with_data("commands", serde_json::json!(request.commands));
        if let serde_json::Value::Object(result) = outcome.to_result_value() {
            for (key, value) in result {
                output = output.with_data(key, value);
            }
        }
        Ok(output)
    }
}

impl Module for DmeValidateModule {
    fn name(&self) -> &'static str {
        "dme_validate"
    }

    fn description(&self) -> &'static str {
        "Validate NX-OS CLI configuration and return the resulting DME model"
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        DmeValidateConfig::from_params(params).map(|_| ())
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let config = DmeValidateConfig::from_params(params)?;
        if !config.has_input() {
            return Ok(ModuleOutput::ok("No lines or src given, nothing to validate"));
        }

        let request = config.to_request()?;
        if request.commands.is_empty() {
            return Ok(ModuleOutput::ok("No configuration commands to validate"));
        }

        block_on_module(Self::execute_async(request, context))
    }
}
