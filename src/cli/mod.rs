//! CLI module for dme-nxos
//!
//! This module provides the command-line interface: argument parsing and the
//! subcommands that drive the DME modules against one device.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// dme-nxos - Cisco NX-OS DME automation
///
/// Read, validate and configure NX-OS switches through the Data Management
/// Engine.
#[derive(Parser, Debug, Clone)]
#[command(name = "dme-nxos")]
#[command(version)]
#[command(about = "Read, validate and configure Cisco NX-OS through the DME", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run in check mode (report changes without applying them)
    #[arg(long = "check", global = true)]
    pub check_mode: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Device host, overriding the configuration file
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "DME_NXOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fetch every object of a DME class
    #[command(name = "read-class")]
    ReadClass(commands::read::ReadClassArgs),

    /// Fetch one managed object by distinguished name
    #[command(name = "read-dn")]
    ReadDn(commands::read::ReadDnArgs),

    /// Validate CLI configuration and print the resulting DME model
    Validate(commands::validate::ValidateArgs),

    /// Apply a DME configuration tree
    Apply(commands::apply::ApplyArgs),

    /// Gather or merge physical interface settings
    Interfaces(commands::interfaces::InterfacesArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["dme-nxos", "read-class", "l1PhysIf"]).unwrap();
        assert!(matches!(cli.command, Commands::ReadClass(_)));
        assert_eq!(cli.output, OutputFormat::Human);
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["dme-nxos", "-vvvv", "read-dn", "sys"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::try_parse_from([
            "dme-nxos",
            "apply",
            "tree.json",
            "--check",
            "--host",
            "10.0.0.1",
            "--output",
            "json",
        ])
        .unwrap();
        assert!(cli.check_mode);
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.host.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_validate_lines() {
        let cli = Cli::try_parse_from([
            "dme-nxos",
            "validate",
            "--parent",
            "interface Ethernet1/1",
            "--line",
            "no shutdown",
            "--line",
            "description uplink",
        ])
        .unwrap();
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.parents, vec!["interface Ethernet1/1"]);
                assert_eq!(args.lines.len(), 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
