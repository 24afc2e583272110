//! DME configuration module.
//!
//! POSTs a DME configuration tree (typically the `model` returned by
//! `dme_validate`) to `/api/mo/sys.json`.

use crate::modules::{
    block_on_module, Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult,
};
use serde_json::Value;
use tracing::info;

/// Parsed module parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DmeConfigConfig {
    /// Configuration tree rooted at `topSystem`
    pub config: Value,
}

impl DmeConfigConfig {
    /// `config` may be an object or a JSON document in a string.
    pub fn from_params(params: &ModuleParams) -> ModuleResult<Self> {
        let config = match params.get("config") {
            None | Some(Value::Null) => {
                return Err(ModuleError::MissingParameter("config".to_string()))
            }
            Some(Value::String(text)) => serde_json::from_str(text).map_err(|e| {
                ModuleError::InvalidParameter(format!("config is not valid JSON: {}", e))
            })?,
            Some(value) => value.clone(),
        };

        if !config.is_object() {
            return Err(ModuleError::InvalidParameter(
                "config must be a DME object tree".to_string(),
            ));
        }

        Ok(Self { config })
    }
}

/// Apply a DME configuration tree
pub struct DmeConfigModule;

impl DmeConfigModule {
    async fn execute_async(
        config: DmeConfigConfig,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let client = context.client()?;
        let outcome = client.configure(&config.config).await?;
        info!("DME configuration applied");

        let output = if outcome.changed {
            ModuleOutput::changed("DME configuration applied")
        } else {
            ModuleOutput::ok("DME configuration unchanged")
        };
        Ok(output.with_data("dme_response", outcome.dme_response))
    }
}

impl Module for DmeConfigModule {
    fn name(&self) -> &'static str {
        "dme_config"
    }

    fn description(&self) -> &'static str {
        "Apply a DME configuration tree to the device"
    }

    fn required_params(&self) -> &[&'static str] {
        &["config"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        DmeConfigConfig::from_params(params).map(|_| ())
    }

    fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let config = DmeConfigConfig::from_params(params)?;

        if context.check_mode {
            return Ok(ModuleOutput::changed("Would apply DME configuration")
                .with_data("config", config.config));
        }

        block_on_module(Self::execute_async(config, context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::HttpMethod;
    use crate::dme::client::SYSTEM_MO_PATH;
    use crate::modules::network::test_support::{params, ScriptedTransport};
    use serde_json::json;

    fn tree() -> Value {
        json!({
            "topSystem": {
                "children": [{
                    "interfaceEntity": {
                        "children": [{"l1PhysIf": {"attributes": {"id": "eth1/1", "adminSt": "up"}}}]
                    }
                }]
            }
        })
    }

    #[test]
    fn test_from_params() {
        let config = DmeConfigConfig::from_params(&params(json!({"config": tree()}))).unwrap();
        assert_eq!(config.config, tree());

        let from_text =
            DmeConfigConfig::from_params(&params(json!({"config": tree().to_string()}))).unwrap();
        assert_eq!(from_text.config, tree());
    }

    #[test]
    fn test_from_params_errors() {
        assert!(matches!(
            DmeConfigConfig::from_params(&params(json!({}))).unwrap_err(),
            ModuleError::MissingParameter(_)
        ));
        assert!(matches!(
            DmeConfigConfig::from_params(&params(json!({"config": "{not json"}))).unwrap_err(),
            ModuleError::InvalidParameter(_)
        ));
        assert!(matches!(
            DmeConfigConfig::from_params(&params(json!({"config": [1, 2]}))).unwrap_err(),
            ModuleError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_execute_posts_tree() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();

        let transport = ScriptedTransport::new(vec![(200, json!({"imdata": []}))]);
        let context = ModuleContext::new().with_transport(transport.clone());

        let output = DmeConfigModule
            .execute(&params(json!({"config": tree()})), &context)
            .unwrap();

        assert!(output.changed);
        assert_eq!(output.data["dme_response"], json!({"imdata": []}));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].path, SYSTEM_MO_PATH);
        assert_eq!(requests[0].body, Some(tree()));
    }

    #[test]
    fn test_empty_tree_is_rejected_before_sending() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();

        let transport = ScriptedTransport::new(Vec::new());
        let context = ModuleContext::new().with_transport(transport.clone());

        let err = DmeConfigModule
            .execute(&params(json!({"config": {}})), &context)
            .unwrap_err();
        assert!(err.to_string().contains("Configuration payload is required"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_check_mode_does_not_send() {
        let transport = ScriptedTransport::new(Vec::new());
        let context = ModuleContext::new()
            .with_transport(transport.clone())
            .with_check_mode(true);

        let output = DmeConfigModule
            .check(&params(json!({"config": tree()})), &context)
            .unwrap();

        assert!(output.changed);
        assert_eq!(output.data["config"], tree());
        assert!(transport.requests().is_empty());
    }
}
