//! # dme-nxos - NX-OS DME request/response engine
//!
//! dme-nxos talks to the Data Management Engine (DME) of Cisco NX-OS switches.
//! It builds read queries against the DME object model, validates CLI
//! configuration through the device's JSON-RPC `cli_rest` endpoint, applies
//! DME configuration trees and maps physical interface settings between
//! playbook form and the `l1PhysIf` class.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      CLI (clap) / Module Registry                    │
//! │      dme_command · dme_validate · dme_config · dme_interfaces        │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           DME Engine                                 │
//! │   parser · jsonrpc · url · interpreter · interfaces · DmeClient      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        RequestDispatcher                             │
//! │          (fail-fast or return-status, error classification)        │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                    │
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Transport (HttpTransport via reqwest)                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use dme_nxos::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = dme_nxos::config::Config::load(None)?;
//!     let transport = Arc::new(HttpTransport::new(&config.device)?);
//!     let client = DmeClient::new(transport);
//!
//!     let outcome = client
//!         .validate(&ValidateRequest::from_text("interface Ethernet1/1\n  no shutdown"))
//!         .await?;
//!     if outcome.is_valid() {
//!         client.configure(&outcome.model).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export commonly used items in prelude
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Connection types
    pub use crate::connection::http::HttpTransport;
    pub use crate::connection::{
        HttpMethod, Transport, TransportError, TransportResponse, TransportResult,
    };
    // Engine
    pub use crate::dme::{
        ClassQuery, CorrelateBy, DispatchResult, DmeAddress, DmeClient, DmeRequest, DmeResponse,
        InterfaceConfig, InterfaceKey, InterfaceModelMapper, MoQuery, RequestDispatcher,
        ResultMode, ValidateRequest, ValidationOutcome,
    };
    // Error handling
    pub use crate::error::{Error, Result};
    // Module system
    pub use crate::modules::{
        Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry,
        ModuleResult,
    };
}

// ============================================================================
// Core Modules
// ============================================================================

/// Error types and result aliases for DME operations.
///
/// This module provides the main [`Error`](error::Error) enum covering
/// precondition failures, classified transport failures, remote HTTP errors
/// and malformed validation batches.
pub mod error;

/// Configuration loading from files and the environment.
pub mod config;

// ============================================================================
// Engine
// ============================================================================

/// DME request/response translation and validation.
///
/// Builders for read URLs and JSON-RPC batches, the validation response
/// interpreter, the request dispatcher and the interface model mapper.
pub mod dme;

// ============================================================================
// Infrastructure
// ============================================================================

/// Transport layer for device communication.
///
/// This module provides the [`Transport`](connection::Transport) trait and
/// the reqwest-based [`HttpTransport`](connection::http::HttpTransport).
pub mod connection;

/// Task modules built on the engine.
///
/// Each module turns loosely typed parameters into engine calls and reports
/// an Ansible-style result.
pub mod modules;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
