//! Device registry access traits.
//!
//! Discovery reads the OS device database through the [`DeviceRegistry`]
//! and [`RegistryKey`] traits rather than touching `winreg` directly, so
//! the whole pipeline runs unchanged against the in-memory fixture used by
//! tests. Keys are plain RAII values; dropping one releases its handle,
//! including on every early return out of the recursive port search.

use thiserror::Error;

#[cfg(windows)]
pub mod windows;
#[cfg(windows)]
pub use windows::WindowsRegistry;

pub mod memory;
pub use memory::{MemoryKey, MemoryRegistry};

/// Registry path of the mounted-devices table, relative to HKLM.
pub const MOUNTED_DEVICES_PATH: &str = r"SYSTEM\MountedDevices";

/// Registry path of the USB device enumeration tree, relative to HKLM.
pub const USB_ENUM_PATH: &str = r"SYSTEM\CurrentControlSet\Enum\USB";

/// Errors surfaced by registry adapters.
///
/// Outside of the single mounted-devices root open, callers treat any of
/// these as "no result for this branch" and move on.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The named key or value does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The key or value exists but could not be read.
    #[error("access failed: {0}")]
    Access(String),
}

/// A hierarchical device database rooted at the machine hive.
pub trait DeviceRegistry {
    type Key: RegistryKey;

    /// Open a key by its path below the root hive.
    fn open(&self, path: &str) -> Result<Self::Key, RegistryError>;
}

/// An open handle onto one key of the device database.
pub trait RegistryKey: Sized {
    /// Open an immediate or nested child key.
    fn open_subkey(&self, name: &str) -> Result<Self, RegistryError>;

    /// Names of all immediate child keys, in enumeration order.
    fn subkey_names(&self) -> Result<Vec<String>, RegistryError>;

    /// All values of this key as (name, raw bytes) pairs, in enumeration
    /// order.
    fn values(&self) -> Result<Vec<(String, Vec<u8>)>, RegistryError>;

    /// Read a single string-typed value.
    fn read_string(&self, name: &str) -> Result<String, RegistryError>;
}
