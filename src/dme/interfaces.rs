//! Physical interface model mapping.
//!
//! Converts between the canonical interface fields used in playbooks and the
//! attributes of the DME `l1PhysIf` class, and builds the configuration tree
//! that merges wanted interface settings into the device.
//!
//! | canonical     | DME          | value transcoding          |
//! |---------------|--------------|----------------------------|
//! | `name`        | `id`         | `Ethernet1/1` <-> `eth1/1` |
//! | `description` | `descr`      |                            |
//! | `speed`       | `speed`      |                            |
//! | `mtu`         | `mtu`        |                            |
//! | `mac_address` | `routerMac`  |                            |
//! | `mode`        | `layer`      |                            |
//! | `duplex`      | `duplex`     |                            |
//! | `snmp`        | `snmpTrapSt` | `true` <-> `enable`        |
//! | `enabled`     | `adminSt`    | `true` <-> `up`            |

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// DME class of physical interfaces
pub const L1_PHYS_IF: &str = "l1PhysIf";

/// Canonical field to DME attribute.
pub const ATTRIBUTE_MAP: [(&str, &str); 9] = [
    ("name", "id"),
    ("description", "descr"),
    ("speed", "speed"),
    ("mtu", "mtu"),
    ("mac_address", "routerMac"),
    ("mode", "layer"),
    ("duplex", "duplex"),
    ("snmp", "snmpTrapSt"),
    ("enabled", "adminSt"),
];

/// DME attribute name for a canonical field.
pub fn dme_attribute(canonical: &str) -> Option<&'static str> {
    ATTRIBUTE_MAP
        .iter()
        .find(|(c, _)| *c == canonical)
        .map(|(_, d)| *d)
}

/// Canonical field name for a DME attribute.
pub fn canonical_field(attribute: &str) -> Option<&'static str> {
    ATTRIBUTE_MAP
        .iter()
        .find(|(_, d)| *d == attribute)
        .map(|(c, _)| *c)
}

/// `Ethernet1/1` -> `eth1/1`. Non-Ethernet names are returned unchanged.
pub fn resolve_interface_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if let Some(rest) = lower.strip_prefix("ethernet") {
        format!("eth{}", rest.trim())
    } else if let Some(rest) = lower.strip_prefix("eth") {
        format!("eth{}", rest.trim())
    } else {
        name.to_string()
    }
}

/// `eth1/1` -> `Ethernet1/1`. Other ids are returned unchanged.
pub fn interface_name_from_id(id: &str) -> String {
    match id.strip_prefix("eth") {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => format!("Ethernet{}", rest),
        _ => id.to_string(),
    }
}

/// `Ethernet1/1` -> `sys/intf/phys-[eth1/1]`.
pub fn interface_dn(name: &str) -> String {
    let id = resolve_interface_name(name);
    if id.starts_with("eth") {
        format!("sys/intf/phys-[{}]", id)
    } else {
        id
    }
}

fn admin_state(enabled: bool) -> &'static str {
    if enabled {
        "up"
    } else {
        "down"
    }
}

fn trap_state(snmp: bool) -> &'static str {
    if snmp {
        "enable"
    } else {
        "disable"
    }
}

/// Canonical interface configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snmp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl InterfaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// How interfaces are keyed when matching wanted against existing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKey {
    /// DME `id`, e.g. `eth1/1`
    #[default]
    Id,
    /// Distinguished name, e.g. `sys/intf/phys-[eth1/1]`
    Dn,
}

impl fmt::Display for InterfaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceKey::Id => write!(f, "id"),
            InterfaceKey::Dn => write!(f, "dn"),
        }
    }
}

impl std::str::FromStr for InterfaceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "id" => Ok(InterfaceKey::Id),
            "dn" => Ok(InterfaceKey::Dn),
            _ => Err(Error::precondition(format!(
                "Invalid interface key '{}'. Valid options: id, dn",
                s
            ))),
        }
    }
}

/// Changes needed to merge wanted interfaces into the device.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    /// Configuration tree to POST to `/api/mo/sys.json`
    pub request: Value,
    /// Interfaces whose attributes will change
    pub changed: Vec<String>,
    /// Interfaces already in the wanted state
    pub unchanged: Vec<String>,
    /// Wanted interfaces that do not exist on the device
    pub missing: Vec<String>,
}

impl MergePlan {
    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }
}

/// Canonical <-> DME mapper for `l1PhysIf`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceModelMapper {
    key: InterfaceKey,
}

impl InterfaceModelMapper {
    pub fn new(key: InterfaceKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> InterfaceKey {
        self.key
    }

    /// Canonical config to DME attributes. Absent fields stay absent.
    pub fn to_dme(config: &InterfaceConfig) -> Map<String, Value> {
        let mut attrs = Map::new();
        attrs.insert(
            "id".to_string(),
            Value::String(resolve_interface_name(&config.name)),
        );

        let text_fields = [
            ("descr", &config.description),
            ("speed", &config.speed),
            ("mtu", &config.mtu),
            ("routerMac", &config.mac_address),
            ("layer", &config.mode),
            ("duplex", &config.duplex),
        ];
        for (attribute, value) in text_fields {
            if let Some(value) = value {
                attrs.insert(attribute.to_string(), Value::String(value.clone()));
            }
        }

        if let Some(snmp) = config.snmp {
            attrs.insert("snmpTrapSt".to_string(), Value::from(trap_state(snmp)));
        }
        if let Some(enabled) = config.enabled {
            attrs.insert("adminSt".to_string(), Value::from(admin_state(enabled)));
        }

        attrs
    }

    /// DME attributes to canonical config, inverting both names and values.
    ///
    /// Unmapped attributes are ignored. Unknown `adminSt`/`snmpTrapSt` values
    /// leave the field unset.
    pub fn from_dme(attrs: &Map<String, Value>) -> Result<InterfaceConfig> {
        let id = attrs
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed("l1PhysIf object has no id attribute"))?;

        let text = |attribute: &str| attrs.get(attribute).and_then(Value::as_str).map(String::from);

        let enabled = match attrs.get("adminSt").and_then(Value::as_str) {
            Some("up") => Some(true),
            Some("down") => Some(false),
            Some(other) => {
                warn!(id, value = other, "unrecognised adminSt value");
                None
            }
            None => None,
        };
        let snmp = match attrs.get("snmpTrapSt").and_then(Value::as_str) {
            Some("enable") => Some(true),
            Some("disable") => Some(false),
            Some(other) => {
                warn!(id, value = other, "unrecognised snmpTrapSt value");
                None
            }
            None => None,
        };

        Ok(InterfaceConfig {
            name: interface_name_from_id(id),
            description: text("descr"),
            speed: text("speed"),
            mtu: text("mtu"),
            mac_address: text("routerMac"),
            mode: text("layer"),
            duplex: text("duplex"),
            snmp,
            enabled,
        })
    }

    /// Key-only inverse: DME attribute names become canonical names, values
    /// and unmapped attributes are passed through untouched.
    pub fn rename_from_dme(attrs: &Map<String, Value>) -> Map<String, Value> {
        attrs
            .iter()
            .map(|(k, v)| {
                let key = canonical_field(k).map_or_else(|| k.clone(), String::from);
                (key, v.clone())
            })
            .collect()
    }

    /// Key of an existing DME object. A missing `dn` is derived from `id`.
    pub fn key_of(&self, attrs: &Map<String, Value>) -> Option<String> {
        let id = attrs.get("id").and_then(Value::as_str);
        match self.key {
            InterfaceKey::Id => id.map(String::from),
            InterfaceKey::Dn => attrs
                .get("dn")
                .and_then(Value::as_str)
                .map(String::from)
                .or_else(|| id.map(interface_dn)),
        }
    }

    /// Key of a wanted interface.
    pub fn want_key(&self, config: &InterfaceConfig) -> String {
        match self.key {
            InterfaceKey::Id => resolve_interface_name(&config.name),
            InterfaceKey::Dn => interface_dn(&config.name),
        }
    }

    /// Fold DME objects into an ordered lookup map. Objects without a key are
    /// skipped.
    pub fn index(&self, objects: &[Map<String, Value>]) -> IndexMap<String, Map<String, Value>> {
        objects
            .iter()
            .filter_map(|attrs| self.key_of(attrs).map(|key| (key, attrs.clone())))
            .collect()
    }

    /// Plan the merge of `want` into `have`.
    ///
    /// Only interfaces that already exist are configured; of those, only the
    /// ones whose attributes differ end up in the request.
    pub fn plan_merge(
        &self,
        want: &[InterfaceConfig],
        have: &IndexMap<String, Map<String, Value>>,
    ) -> MergePlan {
        let mut children = Vec::new();
        let mut changed = Vec::new();
        let mut unchanged = Vec::new();
        let mut missing = Vec::new();

        for config in want {
            let key = self.want_key(config);
            let Some(existing) = have.get(&key) else {
                missing.push(config.name.clone());
                continue;
            };

            let attrs = Self::to_dme(config);
            let differs = attrs
                .iter()
                .any(|(k, v)| k != "id" && existing.get(k) != Some(v));

            if differs {
                children.push(serde_json::json!({ L1_PHYS_IF: { "attributes": attrs } }));
                changed.push(config.name.clone());
            } else {
                unchanged.push(config.name.clone());
            }
        }

        MergePlan {
            request: interface_request(children),
            changed,
            unchanged,
            missing,
        }
    }
}

/// Wrap `l1PhysIf` children in the `topSystem/interfaceEntity` tree.
pub fn interface_request(children: Vec<Value>) -> Value {
    serde_json::json!({
        "topSystem": {
            "children": [
                { "interfaceEntity": { "children": children } }
            ]
        }
    })
}

/// Attribute maps of every `class` object in a class-query body
/// (`{"imdata": [{"<class>": {"attributes": {..}}}], ..}`).
pub fn extract_class_objects(body: &Value, class: &str) -> Vec<Map<String, Value>> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        _ => body
            .get("imdata")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
    };

    items
        .iter()
        .filter_map(|item| item.get(class)?.get("attributes")?.as_object().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resolve_interface_name() {
        assert_eq!(resolve_interface_name("Ethernet1/1"), "eth1/1");
        assert_eq!(resolve_interface_name("ethernet1/10"), "eth1/10");
        assert_eq!(resolve_interface_name("Ethernet 1/2"), "eth1/2");
        assert_eq!(resolve_interface_name("eth1/3"), "eth1/3");
        assert_eq!(resolve_interface_name("loopback0"), "loopback0");
        assert_eq!(resolve_interface_name("Vlan10"), "Vlan10");
    }

    #[test]
    fn test_interface_name_from_id() {
        assert_eq!(interface_name_from_id("eth1/1"), "Ethernet1/1");
        assert_eq!(interface_name_from_id("eth101/1/4"), "Ethernet101/1/4");
        assert_eq!(interface_name_from_id("ethpm"), "ethpm");
        assert_eq!(interface_name_from_id("lo0"), "lo0");
    }

    #[test]
    fn test_interface_dn() {
        assert_eq!(interface_dn("Ethernet1/1"), "sys/intf/phys-[eth1/1]");
        assert_eq!(interface_dn("mgmt0"), "mgmt0");
    }

    #[test]
    fn test_attribute_map_lookup() {
        assert_eq!(dme_attribute("mac_address"), Some("routerMac"));
        assert_eq!(canonical_field("adminSt"), Some("enabled"));
        assert_eq!(dme_attribute("bogus"), None);
        assert_eq!(canonical_field("dn"), None);
    }

    #[test]
    fn test_to_dme() {
        let config = InterfaceConfig {
            description: Some("uplink".to_string()),
            mtu: Some("9216".to_string()),
            mode: Some("layer3".to_string()),
            enabled: Some(true),
            snmp: Some(false),
            ..InterfaceConfig::new("Ethernet1/1")
        };
        assert_eq!(
            Value::Object(InterfaceModelMapper::to_dme(&config)),
            json!({
                "id": "eth1/1",
                "descr": "uplink",
                "mtu": "9216",
                "layer": "layer3",
                "adminSt": "up",
                "snmpTrapSt": "disable"
            })
        );
    }

    #[test]
    fn test_to_dme_leaves_absent_fields_absent() {
        let attrs = InterfaceModelMapper::to_dme(&InterfaceConfig::new("Ethernet1/2"));
        assert_eq!(Value::Object(attrs), json!({"id": "eth1/2"}));
    }

    #[test]
    fn test_from_dme_inverts_values() {
        let config = InterfaceModelMapper::from_dme(&attrs(json!({
            "dn": "sys/intf/phys-[eth1/1]",
            "id": "eth1/1",
            "descr": "to-core",
            "adminSt": "down",
            "snmpTrapSt": "enable",
            "routerMac": "00:11:22:33:44:55",
            "medium": "broadcast"
        })))
        .unwrap();

        assert_eq!(
            config,
            InterfaceConfig {
                description: Some("to-core".to_string()),
                mac_address: Some("00:11:22:33:44:55".to_string()),
                enabled: Some(false),
                snmp: Some(true),
                ..InterfaceConfig::new("Ethernet1/1")
            }
        );
    }

    #[test]
    fn test_round_trip_through_canonical_form() {
        let dme = attrs(json!({
            "id": "eth1/5",
            "descr": "server",
            "speed": "10G",
            "mtu": "1500",
            "routerMac": "not-applicable",
            "layer": "Layer2",
            "duplex": "auto",
            "snmpTrapSt": "enable",
            "adminSt": "up"
        }));
        let canonical = InterfaceModelMapper::from_dme(&dme).unwrap();
        assert_eq!(InterfaceModelMapper::to_dme(&canonical), dme);
        assert_eq!(
            InterfaceModelMapper::from_dme(&InterfaceModelMapper::to_dme(&canonical)).unwrap(),
            canonical
        );
    }

    #[test]
    fn test_from_dme_requires_id() {
        let err = InterfaceModelMapper::from_dme(&attrs(json!({"descr": "x"}))).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_from_dme_unknown_state_left_unset() {
        let config =
            InterfaceModelMapper::from_dme(&attrs(json!({"id": "eth1/1", "adminSt": "testing"})))
                .unwrap();
        assert_eq!(config.enabled, None);
    }

    #[test]
    fn test_rename_from_dme_keeps_raw_values() {
        let renamed = InterfaceModelMapper::rename_from_dme(&attrs(json!({
            "id": "eth1/1",
            "adminSt": "up",
            "snmpTrapSt": "disable",
            "dn": "sys/intf/phys-[eth1/1]"
        })));
        assert_eq!(
            Value::Object(renamed),
            json!({
                "name": "eth1/1",
                "enabled": "up",
                "snmp": "disable",
                "dn": "sys/intf/phys-[eth1/1]"
            })
        );
    }

    #[test]
    fn test_keying_strategies() {
        let objects = vec![
            attrs(json!({"id": "eth1/1", "dn": "sys/intf/phys-[eth1/1]"})),
            attrs(json!({"id": "eth1/2"})),
            attrs(json!({"descr": "no key"})),
        ];

        let by_id = InterfaceModelMapper::new(InterfaceKey::Id).index(&objects);
        assert_eq!(by_id.keys().collect::<Vec<_>>(), vec!["eth1/1", "eth1/2"]);

        let by_dn = InterfaceModelMapper::new(InterfaceKey::Dn).index(&objects);
        assert_eq!(
            by_dn.keys().collect::<Vec<_>>(),
            vec!["sys/intf/phys-[eth1/1]", "sys/intf/phys-[eth1/2]"]
        );

        let config = InterfaceConfig::new("Ethernet1/2");
        assert_eq!(InterfaceModelMapper::new(InterfaceKey::Id).want_key(&config), "eth1/2");
        assert_eq!(
            InterfaceModelMapper::new(InterfaceKey::Dn).want_key(&config),
            "sys/intf/phys-[eth1/2]"
        );
    }

    #[test]
    fn test_plan_merge() {
        let mapper = InterfaceModelMapper::default();
        let have = mapper.index(&[
            attrs(json!({"id": "eth1/1", "descr": "old", "adminSt": "up"})),
            attrs(json!({"id": "eth1/2", "descr": "same", "adminSt": "up"})),
        ]);
        let want = vec![
            InterfaceConfig {
                description: Some("new".to_string()),
                enabled: Some(true),
                ..InterfaceConfig::new("Ethernet1/1")
            },
            InterfaceConfig {
                description: Some("same".to_string()),
                ..InterfaceConfig::new("Ethernet1/2")
            },
            InterfaceConfig::new("Ethernet1/48"),
        ];

        let plan = mapper.plan_merge(&want, &have);
        assert!(plan.has_changes());
        assert_eq!(plan.changed, vec!["Ethernet1/1"]);
        assert_eq!(plan.unchanged, vec!["Ethernet1/2"]);
        assert_eq!(plan.missing, vec!["Ethernet1/48"]);
        assert_eq!(
            plan.request,
            json!({
                "topSystem": {
                    "children": [{
                        "interfaceEntity": {
                            "children": [{
                                "l1PhysIf": {
                                    "attributes": {"id": "eth1/1", "descr": "new", "adminSt": "up"}
                                }
                            }]
                        }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_extract_class_objects() {
        let body = json!({
            "totalCount": "2",
            "imdata": [
                {"l1PhysIf": {"attributes": {"id": "eth1/1"}}},
                {"ethpmPhysIf": {"attributes": {"id": "eth1/1"}}},
                {"l1PhysIf": {"attributes": {"id": "eth1/2"}}}
            ]
        });
        let objects = extract_class_objects(&body, L1_PHYS_IF);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[1]["id"], json!("eth1/2"));

        assert!(extract_class_objects(&json!({}), L1_PHYS_IF).is_empty());
        let bare = json!([{"l1PhysIf": {"attributes": {"id": "eth1/9"}}}]);
        assert_eq!(extract_class_objects(&bare, L1_PHYS_IF).len(), 1);
    }
}
