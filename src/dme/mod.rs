//! DME request/response engine.
//!
//! This module translates between automation input and the NX-OS Data
//! Management Engine. It is transport-agnostic: every request leaves through a
//! [`RequestDispatcher`] over a [`Transport`](crate::connection::Transport).
//!
//! # Flows
//!
//! ```text
//!  read      DmeAddress ──> url ─────────────────────> dispatcher (GET) ──> raw JSON
//!
//!  validate  CLI text ──> parser ──> jsonrpc batch ──> dispatcher (POST /ins)
//!                                                           │
//!                                                           v
//!                                      interpreter ──> ValidationOutcome {model, errors}
//!
//!  configure DME tree ─────────────────────────────> dispatcher (POST /api/mo/sys.json)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use dme_nxos::dme::{DmeClient, ValidateRequest};
//!
//! let client = DmeClient::new(transport);
//! let outcome = client
//!     .validate(&ValidateRequest::from_text("interface Ethernet1/1\n  no shutdown"))
//!     .await?;
//! if outcome.is_valid() {
//!     client.configure(&outcome.model).await?;
//! }
//! ```

pub mod client;
pub mod dispatcher;
pub mod interfaces;
pub mod interpreter;
pub mod jsonrpc;
pub mod parser;
pub mod url;

pub use client::{ConfigureOutcome, DmeClient, DmeRequest, DmeResponse, ValidateRequest};
pub use dispatcher::{ApiKind, DispatchResult, RequestDispatcher, RequestLine, ResultMode};
pub use interfaces::{InterfaceConfig, InterfaceKey, InterfaceModelMapper, MergePlan};
pub use interpreter::{
    interpret, interpret_with, parse_batch, CorrelateBy, ErrorCorrelation, ValidationOutcome,
};
pub use jsonrpc::{build_batch, JsonRpcRequest, JsonRpcResponseEntry};
pub use parser::{parse_config_block, ConfigLine, ConfigSections};
pub use url::{build_class_url, build_mo_url, ClassQuery, DmeAddress, MoQuery};
