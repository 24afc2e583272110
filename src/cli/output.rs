//! Output formatting module for dme-nxos
//!
//! Renders module results as a colored status line followed by the result
//! data, or as plain JSON / YAML for scripting.

use super::OutputFormat;
use anyhow::Result;
use colored::Colorize;
use dme_nxos::modules::{ModuleOutput, ModuleStatus};
use std::collections::BTreeMap;

/// Output formatter for the selected output mode
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Selected format
    format: OutputFormat,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();
        Self { use_color, format }
    }

    fn status_label(&self, status: ModuleStatus) -> String {
        let label = status.to_string();
        if !self.use_color {
            return label;
        }
        match status {
            ModuleStatus::Ok => label.green().to_string(),
            ModuleStatus::Changed => label.yellow().to_string(),
            ModuleStatus::Failed => label.red().bold().to_string(),
        }
    }

    /// Render a module result in the selected format.
    pub fn render(&self, module: &str, output: &ModuleOutput) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&output.to_value())?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&output.to_value())?),
            OutputFormat::Human => {
                let mut text = format!(
                    "{}: [{}] {}",
                    self.status_label(output.status),
                    module,
                    output.msg
                );
                if !output.data.is_empty() {
                    let data: BTreeMap<_, _> = output.data.iter().collect();
                    text.push('\n');
                    text.push_str(&serde_json::to_string_pretty(&data)?);
                }
                Ok(text)
            }
        }
    }

    /// Print a module result to stdout
    pub fn result(&self, module: &str, output: &ModuleOutput) -> Result<()> {
        println!("{}", self.render(module, output)?);
        Ok(())
    }

    /// Print an error message to stderr
    pub fn error(&self, module: &str, message: &str) {
        match self.format {
            OutputFormat::Json => {
                let value = serde_json::json!({ "failed": true, "msg": message });
                eprintln!("{}", value);
            }
            OutputFormat::Yaml | OutputFormat::Human => {
                eprintln!(
                    "{}: [{}] {}",
                    self.status_label(ModuleStatus::Failed),
                    module,
                    message
                );
            }
        }
    }
}
