//! Shared helpers for the DME network modules.
//!
//! Interface naming on NX-OS is loose in playbooks (`eth1/1`, `Eth 1/1`,
//! `Ethernet1/1` all mean the same port); these helpers normalise names and
//! search object lists returned by the device.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;

pub use crate::dme::interfaces::interface_dn;

/// Digits and separators that make up an interface number (`1/1`, `10.100`)
static INTERFACE_NUMBER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9/.]+").expect("Invalid interface number regex"));

// ============================================================================
// Interface Types
// ============================================================================

/// Kind of NX-OS interface, derived from its name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    Ethernet,
    Svi,
    Loopback,
    Management,
    PortChannel,
    Nve,
    Unknown,
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterfaceType::Ethernet => "ethernet",
            InterfaceType::Svi => "svi",
            InterfaceType::Loopback => "loopback",
            InterfaceType::Management => "management",
            InterfaceType::PortChannel => "portchannel",
            InterfaceType::Nve => "nve",
            InterfaceType::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Classify an interface by its name prefix.
pub fn interface_type(name: &str) -> InterfaceType {
    let upper = name.trim().to_uppercase();
    if upper.starts_with("ET") {
        InterfaceType::Ethernet
    } else if upper.starts_with("VL") {
        InterfaceType::Svi
    } else if upper.starts_with("LO") {
        InterfaceType::Loopback
    } else if upper.starts_with("MG") || upper.starts_with("MA") {
        InterfaceType::Management
    } else if upper.starts_with("PO") {
        InterfaceType::PortChannel
    } else if upper.starts_with("NV") {
        InterfaceType::Nve
    } else {
        InterfaceType::Unknown
    }
}

/// Canonical NX-OS spelling of an interface name.
///
/// `eth1/1` and `Eth 1/1` become `Ethernet1/1`; `vl10` becomes `Vlan10`;
/// `lo0` becomes `loopback0`; `po5` becomes `port-channel5`. Names with an
/// unrecognised prefix are returned unchanged.
pub fn normalize_interface(name: &str) -> String {
    let lower = name.to_lowercase();
    let prefix = if lower.starts_with("et") {
        "Ethernet"
    } else if lower.starts_with("vl") {
        "Vlan"
    } else if lower.starts_with("lo") {
        "loopback"
    } else if lower.starts_with("po") {
        "port-channel"
    } else if lower.starts_with("nv") {
        "nve"
    } else {
        return name.to_string();
    };

    let parts: Vec<&str> = name.split(' ').collect();
    let number = if parts.len() == 2 {
        parts[1].trim().to_string()
    } else {
        INTERFACE_NUMBER_REGEX
            .find_iter(name)
            .map(|m| m.as_str())
            .collect()
    };

    format!("{}{}", prefix, number)
}

// ============================================================================
// Object Search
// ============================================================================

fn key_matches(candidate: &Value, wanted: &str) -> bool {
    match candidate {
        Value::String(s) => s.trim() == wanted.trim(),
        Value::Number(n) => n.to_string() == wanted.trim(),
        Value::Bool(b) => b.to_string() == wanted.trim(),
        _ => false,
    }
}

/// First object in `list` whose `key` equals `value`, with its position.
///
/// String values are compared with surrounding whitespace trimmed. Entries
/// that are not JSON objects are skipped.
pub fn find_object_by_key<'a>(
    list: &'a [Value],
    key: &str,
    value: &str,
) -> Option<(&'a Map<String, Value>, usize)> {
    list.iter().enumerate().find_map(|(index, item)| {
        let object = item.as_object()?;
        object
            .get(key)
            .filter(|candidate| key_matches(candidate, value))
            .map(|_| (object, index))
    })
}
