//! Subcommands module for dme-nxos CLI
//!
//! Every subcommand translates its arguments into module parameters and runs
//! the matching module from the registry against the configured device.

pub mod apply;
pub mod interfaces;
pub mod read;
pub mod validate;

use crate::cli::output::OutputFormatter;
use anyhow::{Context, Result};
use dme_nxos::config::Config;
use dme_nxos::connection::http::HttpTransport;
use dme_nxos::connection::Transport;
use dme_nxos::modules::{ModuleContext, ModuleParams, ModuleRegistry};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Exit status when the device rejected submitted commands
pub const EXIT_REJECTED: i32 = 1;

/// Exit status for missing or invalid settings
pub const EXIT_USAGE: i32 = 4;

/// Common context shared between commands
pub struct CommandContext {
    /// Configuration
    pub config: Config,
    /// Output formatter
    pub output: OutputFormatter,
    /// Verbosity level
    pub verbosity: u8,
    /// Check mode (dry-run)
    pub check_mode: bool,
    /// Module registry
    pub registry: Arc<ModuleRegistry>,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli, mut config: Config) -> Self {
        if let Some(host) = &cli.host {
            config.device.host = Some(host.clone());
        }

        Self {
            output: OutputFormatter::new(!cli.no_color, cli.output),
            config,
            verbosity: cli.verbosity(),
            check_mode: cli.check_mode,
            registry: Arc::new(ModuleRegistry::with_builtins()),
        }
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        let transport = HttpTransport::new(&self.config.device)
            .context("Cannot connect: set --host, DME_HOST or device.host in the config file")?;
        debug!(base_url = %transport.base_url(), "using HTTP transport");
        Ok(Arc::new(transport))
    }

    /// Run a module against the device and print its result.
    ///
    /// Returns the process exit status.
    pub async fn run_module(&self, module: &'static str, params: ModuleParams) -> Result<i32> {
        let transport = match self.transport() {
            Ok(transport) => transport,
            Err(e) => {
                self.output.error(module, &format!("{:#}", e));
                return Ok(EXIT_USAGE);
            }
        };

        let context = ModuleContext::new()
            .with_check_mode(self.check_mode)
            .with_debug(self.config.device.debug || self.verbosity >= 2)
            .with_transport(transport);

        let registry = Arc::clone(&self.registry);
        let result =
            tokio::task::spawn_blocking(move || registry.execute(module, &params, &context))
                .await
                .context("module task failed")?;

        match result {
            Ok(output) => {
                self.output.result(module, &output)?;
                let rejected = output.data.get("valid") == Some(&serde_json::Value::Bool(false));
                Ok(if output.failed || rejected {
                    EXIT_REJECTED
                } else {
                    0
                })
            }
            Err(e) => {
                self.output.error(module, &e.to_string());
                Ok(e.exit_code())
            }
        }
    }
}

/// Read a JSON or YAML document from a file, or from stdin for `-`.
pub fn read_document(path: &Path) -> Result<serde_json::Value> {
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };

    // YAML is a superset of JSON
    serde_yaml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Build module parameters from key/value pairs, skipping `None` values.
pub fn module_params<I>(pairs: I) -> ModuleParams
where
    I: IntoIterator<Item = (&'static str, Option<serde_json::Value>)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
        .collect()
}
