//! Serial port resolution for a discovered device identifier.
//!
//! A board's composite USB device frequently registers its mass-storage
//! and serial interfaces as sibling nodes rather than under one key. The
//! storage side carries the identifier we discovered; the serial side may
//! sit under a different vendor branch entirely, associated only through a
//! `ParentIdPrefix` hint. Resolution therefore has two phases: read the
//! port directly off any node named by the identifier, and failing that,
//! follow the parent-prefix hint to every sibling whose instance name
//! contains it and try again, recursively.
//!
//! Resolution never errors. Every absent key or value is a miss for that
//! branch, and a board with no resolvable port is a normal outcome
//! (storage-only firmware, port parked under an unexpected node).

use crate::registry::RegistryKey;
use crate::tracing::prelude::*;
use std::collections::HashSet;

const DEVICE_PARAMETERS_KEY: &str = "Device Parameters";
const PORT_NAME_VALUE: &str = "PortName";
const PARENT_ID_PREFIX_VALUE: &str = "ParentIdPrefix";

/// Resolve the communication port for a device identifier, searching the
/// USB enumeration tree rooted at `usb`.
pub fn resolve_port<K: RegistryKey>(usb: &K, identifier: &str) -> Option<String> {
    let mut visited = HashSet::new();
    let port = resolve(usb, identifier, &mut visited);
    debug!(identifier, ?port, "port resolution");
    port
}

fn resolve<K: RegistryKey>(
    usb: &K,
    identifier: &str,
    visited: &mut HashSet<String>,
) -> Option<String> {
    // A revisited identifier means a parent-prefix loop in the registry;
    // treat it as a miss rather than recurse forever.
    if !visited.insert(identifier.to_string()) {
        warn!(identifier, "cyclic parent reference in USB enumeration");
        return None;
    }

    // Any vendor branch may hold a node for this identifier.
    let matches = device_nodes(usb, identifier);

    // Common case: the node itself names its port.
    for node in &matches {
        if let Some(port) = direct_port(node) {
            return Some(port);
        }
    }

    // Fall back to the sibling association. Each matched node may carry a
    // ParentIdPrefix naming the composite parent; any device instance in
    // any branch containing that prefix is a sibling worth resolving.
    for node in &matches {
        let Ok(prefix) = node.read_string(PARENT_ID_PREFIX_VALUE) else {
            continue;
        };
        for branch in usb.subkey_names().unwrap_or_default() {
            let Ok(branch_key) = usb.open_subkey(&branch) else {
                continue;
            };
            for device in branch_key.subkey_names().unwrap_or_default() {
                if device.contains(&prefix) {
                    if let Some(port) = resolve(usb, &device, visited) {
                        return Some(port);
                    }
                }
            }
        }
    }

    None
}

/// Collect every vendor branch's node named exactly `identifier`.
fn device_nodes<K: RegistryKey>(usb: &K, identifier: &str) -> Vec<K> {
    let mut nodes = Vec::new();
    for branch in usb.subkey_names().unwrap_or_default() {
        let Ok(branch_key) = usb.open_subkey(&branch) else {
            continue;
        };
        if let Ok(node) = branch_key.open_subkey(identifier) {
            nodes.push(node);
        }
    }
    nodes
}

fn direct_port<K: RegistryKey>(node: &K) -> Option<String> {
    let params = node.open_subkey(DEVICE_PARAMETERS_KEY).ok()?;
    let port = params.read_string(PORT_NAME_VALUE).ok()?;
    if port.is_empty() {
        None
    } else {
        Some(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryKey;

    fn node_with_port(port: &str) -> MemoryKey {
        MemoryKey::new().with_subkey(
            DEVICE_PARAMETERS_KEY,
            MemoryKey::new().with_string(PORT_NAME_VALUE, port),
        )
    }

    #[test]
    fn test_direct_port() {
        let usb = MemoryKey::new().with_subkey(
            "VID_0D28&PID_0204",
            MemoryKey::new().with_subkey("ABCDEF123456", node_with_port("COM3")),
        );
        assert_eq!(resolve_port(&usb, "ABCDEF123456").as_deref(), Some("COM3"));
    }

    #[test]
    fn test_missing_identifier_is_none() {
        let usb = MemoryKey::new().with_subkey(
            "VID_0D28&PID_0204",
            MemoryKey::new().with_subkey("ABCDEF123456", node_with_port("COM3")),
        );
        assert_eq!(resolve_port(&usb, "0123456789AB"), None);
    }

    #[test]
    fn test_empty_port_name_is_none() {
        let usb = MemoryKey::new().with_subkey(
            "VID_0D28&PID_0204",
            MemoryKey::new().with_subkey("ABCDEF123456", node_with_port("")),
        );
        assert_eq!(resolve_port(&usb, "ABCDEF123456"), None);
    }

    #[test]
    fn test_parent_prefix_hop_to_sibling() {
        // Storage node carries only a ParentIdPrefix; the serial sibling
        // under another branch embeds that prefix in its instance name.
        let usb = MemoryKey::new()
            .with_subkey(
                "VID_0D28&PID_0204&MI_00",
                MemoryKey::new().with_subkey(
                    "ABCDEF123456",
                    MemoryKey::new().with_string(PARENT_ID_PREFIX_VALUE, "7&2f"),
                ),
            )
            .with_subkey(
                "VID_0D28&PID_0204&MI_01",
                MemoryKey::new().with_subkey("7&2f00aa&0&0001", node_with_port("COM5")),
            );
        assert_eq!(resolve_port(&usb, "ABCDEF123456").as_deref(), Some("COM5"));
    }

    #[test]
    fn test_two_prefix_hops() {
        let usb = MemoryKey::new()
            .with_subkey(
                "VID_A",
                MemoryKey::new().with_subkey(
                    "ROOT00000001",
                    MemoryKey::new().with_string(PARENT_ID_PREFIX_VALUE, "hop1"),
                ),
            )
            .with_subkey(
                "VID_B",
                MemoryKey::new().with_subkey(
                    "hop1&mid",
                    MemoryKey::new().with_string(PARENT_ID_PREFIX_VALUE, "hop2"),
                ),
            )
            .with_subkey(
                "VID_C",
                MemoryKey::new().with_subkey("hop2&leaf", node_with_port("COM9")),
            );
        assert_eq!(resolve_port(&usb, "ROOT00000001").as_deref(), Some("COM9"));
    }

    #[test]
    fn test_cyclic_parent_reference_terminates() {
        // Two nodes whose prefixes name each other. Without the visited
        // set this would recurse forever; with it, resolution is a miss.
        let usb = MemoryKey::new()
            .with_subkey(
                "VID_A",
                MemoryKey::new().with_subkey(
                    "first&node",
                    MemoryKey::new().with_string(PARENT_ID_PREFIX_VALUE, "second"),
                ),
            )
            .with_subkey(
                "VID_B",
                MemoryKey::new().with_subkey(
                    "second&node",
                    MemoryKey::new().with_string(PARENT_ID_PREFIX_VALUE, "first"),
                ),
            );
        assert_eq!(resolve_port(&usb, "first&node"), None);
    }

    #[test]
    fn test_empty_tree_is_none() {
        let usb = MemoryKey::new();
        assert_eq!(resolve_port(&usb, "ABCDEF123456"), None);
    }
}
