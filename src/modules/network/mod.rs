//! NX-OS DME network modules
//!
//! Task-level wrappers around the [`crate::dme`] engine. Each module parses
//! its loosely typed parameters into a typed configuration, runs the matching
//! engine flow over the context's transport and reports an Ansible-style
//! result.
//!
//! | module           | flow                                              |
//! |------------------|---------------------------------------------------|
//! | `dme_command`    | GET class / managed-object queries                |
//! | `dme_validate`   | CLI text -> JSON-RPC `cli_rest` batch -> DME model |
//! | `dme_config`     | POST a DME tree to `/api/mo/sys.json`             |
//! | `dme_interfaces` | gather `l1PhysIf` and merge wanted attributes     |
//!
//! # Example Usage
//!
//! ```yaml
//! - name: Validate, then apply
//!   dme_validate:
//!     lines:
//!       - interface Ethernet1/1
//!       - "  no shutdown"
//!   register: validated
//!
//! - dme_config:
//!     config: "{{ validated.model }}"
//!   when: validated.valid
//! ```

pub mod common;
pub mod dme_command;
pub mod dme_config;
pub mod dme_interfaces;
pub mod dme_validate;

pub use common::{
    find_object_by_key, interface_dn, interface_type, normalize_interface, InterfaceType,
};
pub use dme_command::DmeCommandModule;
pub use dme_config::DmeConfigModule;
pub use dme_interfaces::DmeInterfacesModule;
pub use dme_validate::DmeValidateModule;

use super::ModuleRegistry;
use std::sync::Arc;

/// Register all network modules with the given registry
pub fn register_network_modules(registry: &mut ModuleRegistry) {
    registry.register(Arc::new(DmeCommandModule));
    registry.register(Arc::new(DmeValidateModule));
    registry.register(Arc::new(DmeConfigModule));
    registry.register(Arc::new(DmeInterfacesModule));
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_network_modules() {
        let mut registry = ModuleRegistry::new();
        register_network_modules(&mut registry);

        for name in ["dme_command", "dme_validate", "dme_config", "dme_interfaces"] {
            let module = registry.get(name).unwrap();
            assert_eq!(module.name(), name);
            assert!(!module.description().is_empty());
        }
    }
}
