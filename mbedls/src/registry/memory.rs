//! In-memory device registry.
//!
//! A cheap tree of keys and values with the same shape the Windows
//! registry exposes, used by the test suites and handy for reproducing a
//! reported machine's registry offline. Keys are built fluently:
//!
//! ```
//! use mbedls::registry::{MemoryKey, MemoryRegistry};
//!
//! let usb = MemoryKey::new().with_subkey(
//!     "VID_0D28&PID_0204",
//!     MemoryKey::new().with_subkey(
//!         "0240000033514e45001f500585d40014e981000097969900",
//!         MemoryKey::new().with_subkey(
//!             "Device Parameters",
//!             MemoryKey::new().with_string("PortName", "COM7"),
//!         ),
//!     ),
//! );
//! let registry = MemoryRegistry::new()
//!     .with_key(r"SYSTEM\CurrentControlSet\Enum\USB", usb);
//! ```

use super::{DeviceRegistry, RegistryError, RegistryKey};
use std::collections::BTreeMap;

/// Registry fixture mapping HKLM-relative paths to key trees.
#[derive(Debug, Default, Clone)]
pub struct MemoryRegistry {
    roots: BTreeMap<String, MemoryKey>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount a key tree at an HKLM-relative path.
    pub fn with_key(mut self, path: &str, key: MemoryKey) -> Self {
        self.roots.insert(path.to_string(), key);
        self
    }
}

impl DeviceRegistry for MemoryRegistry {
    type Key = MemoryKey;

    fn open(&self, path: &str) -> Result<Self::Key, RegistryError> {
        self.roots
            .get(path)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(path.to_string()))
    }
}

/// One key of the in-memory registry.
///
/// Values are stored separately by type: binary blobs are what
/// `MountedDevices` holds, strings are what `PortName` and
/// `ParentIdPrefix` hold. Cloning is deep; the fixtures involved are tiny.
#[derive(Debug, Default, Clone)]
pub struct MemoryKey {
    subkeys: Vec<(String, MemoryKey)>,
    binary_values: Vec<(String, Vec<u8>)>,
    string_values: BTreeMap<String, String>,
}

impl MemoryKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subkey(mut self, name: &str, key: MemoryKey) -> Self {
        self.subkeys.push((name.to_string(), key));
        self
    }

    pub fn with_binary(mut self, name: &str, bytes: &[u8]) -> Self {
        self.binary_values.push((name.to_string(), bytes.to_vec()));
        self
    }

    pub fn with_string(mut self, name: &str, value: &str) -> Self {
        self.string_values
            .insert(name.to_string(), value.to_string());
        self
    }
}

impl RegistryKey for MemoryKey {
    fn open_subkey(&self, name: &str) -> Result<Self, RegistryError> {
        // Nested paths open like the real registry does.
        let mut current = self;
        for part in name.split('\\') {
            current = current
                .subkeys
                .iter()
                .find(|(n, _)| n == part)
                .map(|(_, k)| k)
                .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;
        }
        Ok(current.clone())
    }

    fn subkey_names(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.subkeys.iter().map(|(n, _)| n.clone()).collect())
    }

    fn values(&self) -> Result<Vec<(String, Vec<u8>)>, RegistryError> {
        Ok(self.binary_values.clone())
    }

    fn read_string(&self, name: &str) -> Result<String, RegistryError> {
        self.string_values
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_root_is_not_found() {
        let registry = MemoryRegistry::new();
        assert!(matches!(
            registry.open(r"SYSTEM\MountedDevices"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_nested_subkey_open() {
        let key = MemoryKey::new().with_subkey(
            "a",
            MemoryKey::new()
                .with_subkey("b", MemoryKey::new().with_string("v", "x")),
        );
        let b = key.open_subkey(r"a\b").unwrap();
        assert_eq!(b.read_string("v").unwrap(), "x");
    }

    #[test]
    fn test_values_preserve_insertion_order() {
        let key = MemoryKey::new()
            .with_binary("second", &[2])
            .with_binary("first", &[1]);
        let names: Vec<_> =
            key.values().unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["second", "first"]);
    }
}
