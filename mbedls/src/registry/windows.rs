//! Windows registry adapter backed by the `winreg` crate.

use super::{DeviceRegistry, RegistryError, RegistryKey};
use std::io;
use winreg::enums::HKEY_LOCAL_MACHINE;
use winreg::RegKey;

fn map_err(context: &str, err: io::Error) -> RegistryError {
    match err.kind() {
        io::ErrorKind::NotFound => RegistryError::NotFound(context.to_string()),
        _ => RegistryError::Access(format!("{context}: {err}")),
    }
}

/// Live registry rooted at HKEY_LOCAL_MACHINE.
pub struct WindowsRegistry;

impl DeviceRegistry for WindowsRegistry {
    type Key = WindowsKey;

    fn open(&self, path: &str) -> Result<Self::Key, RegistryError> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = hklm.open_subkey(path).map_err(|e| map_err(path, e))?;
        Ok(WindowsKey(key))
    }
}

/// An open HKLM subkey. The underlying handle is closed on drop.
pub struct WindowsKey(RegKey);

impl RegistryKey for WindowsKey {
    fn open_subkey(&self, name: &str) -> Result<Self, RegistryError> {
        let key = self.0.open_subkey(name).map_err(|e| map_err(name, e))?;
        Ok(WindowsKey(key))
    }

    fn subkey_names(&self) -> Result<Vec<String>, RegistryError> {
        self.0
            .enum_keys()
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| map_err("enum_keys", e))
    }

    fn values(&self) -> Result<Vec<(String, Vec<u8>)>, RegistryError> {
        self.0
            .enum_values()
            .map(|entry| entry.map(|(name, value)| (name, value.bytes)))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| map_err("enum_values", e))
    }

    fn read_string(&self, name: &str) -> Result<String, RegistryError> {
        self.0
            .get_value::<String, _>(name)
            .map_err(|e| map_err(name, e))
    }
}
