//! Storage-device enumeration and identifier extraction.
//!
//! Walks the mounted-devices table down to the set of connected mbed
//! storage volumes: enumerate every DosDevices record, keep the vendor's,
//! extract the mount point and device identifier, and drop anything whose
//! volume is not actually present on the filesystem right now.

use crate::discovery::decode::decode_device_string;
use crate::error::{Error, Result};
use crate::registry::{DeviceRegistry, RegistryKey, MOUNTED_DEVICES_PATH};
use crate::tracing::prelude::*;
use regex::Regex;
use std::path::Path;

/// Marker in a mounted-device value name for drive-letter mounts.
const DOS_DEVICES_MARKER: &str = "DosDevices";

/// Vendor marker in a decoded device description, compared
/// case-insensitively.
const VENDOR_MARKER: &str = "VEN_MBED";

/// A mounted-device record with its value decoded.
#[derive(Debug, Clone)]
pub struct DosDevice {
    /// Registry value name, e.g. `\DosDevices\E:`.
    pub key: String,
    /// Decoded device description, e.g.
    /// `\??\USBSTOR#Disk&Ven_MBED&Prod_microcontroller...`.
    pub description: String,
}

/// A storage volume with both discovery fields extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDevice {
    /// Drive designator, e.g. `E:`.
    pub mount: String,
    /// Device instance identifier, e.g. `0200020113F4A2A569556DD7`.
    pub id: String,
}

/// Whether a mount point is currently present on the filesystem.
///
/// A trait seam so discovery can be exercised without real drives; the
/// check is a snapshot, the volume may be gone the moment after.
pub trait MountCheck {
    fn exists(&self, mount: &str) -> bool;
}

/// Production mount check against the local filesystem.
pub struct FsMountCheck;

impl MountCheck for FsMountCheck {
    fn exists(&self, mount: &str) -> bool {
        // `E:` alone would resolve drive-relative; check the drive root.
        Path::new(&format!("{mount}\\")).exists()
    }
}

/// Extraction patterns, compiled once per discovery pass.
pub struct Extractor {
    mount: Regex,
    id: Regex,
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            mount: Regex::new(r"\\(.:)$").expect("valid mount pattern"),
            id: Regex::new("[0-9A-Fa-f]{10,36}").expect("valid id pattern"),
        }
    }

    /// Extract mount point and device identifier from one record.
    ///
    /// A record that cannot yield both fields is not a usable board;
    /// callers drop it (with a diagnostic) rather than abort the pass.
    pub fn extract(&self, device: &DosDevice) -> Result<StorageDevice> {
        let mount = self
            .mount
            .captures(&device.key)
            .and_then(|c| c.get(1))
            .ok_or_else(|| {
                Error::MalformedRecord(format!(
                    "no drive letter in key {:?}",
                    device.key
                ))
            })?;
        let id = self.id.find(&device.description).ok_or_else(|| {
            Error::MalformedRecord(format!(
                "no device identifier in description {:?}",
                device.description
            ))
        })?;
        Ok(StorageDevice {
            mount: mount.as_str().to_string(),
            id: id.as_str().to_string(),
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Enumerate every DosDevices record in the mounted-devices table, vendor
/// or not, with values decoded.
///
/// Failure to open or read the table is fatal: nothing downstream is
/// meaningful without this enumeration.
pub fn dos_devices<R: DeviceRegistry>(registry: &R) -> Result<Vec<DosDevice>> {
    let mounts = registry
        .open(MOUNTED_DEVICES_PATH)
        .map_err(Error::MountedDevices)?;
    let values = mounts.values().map_err(Error::MountedDevices)?;
    let devices: Vec<DosDevice> = values
        .into_iter()
        .filter(|(name, _)| name.contains(DOS_DEVICES_MARKER))
        .map(|(key, raw)| DosDevice {
            description: decode_device_string(&raw),
            key,
        })
        .collect();
    trace!(count = devices.len(), "enumerated DosDevices records");
    Ok(devices)
}

/// Keep only records carrying the vendor marker.
pub fn mbed_devices(devices: Vec<DosDevice>) -> Vec<DosDevice> {
    devices
        .into_iter()
        .filter(|d| d.description.to_ascii_uppercase().contains(VENDOR_MARKER))
        .collect()
}

/// Produce the connected set: enumerate, filter to the vendor, extract
/// both discovery fields, and keep only volumes present on disk.
///
/// Records failing extraction are skipped; each skip is logged at debug
/// level so a missing board can be diagnosed with RUST_LOG=debug.
pub fn connected_boards<R, M>(
    registry: &R,
    mounts: &M,
) -> Result<Vec<StorageDevice>>
where
    R: DeviceRegistry,
    M: MountCheck,
{
    let extractor = Extractor::new();
    let mut boards = Vec::new();
    for device in mbed_devices(dos_devices(registry)?) {
        match extractor.extract(&device) {
            Ok(board) => {
                if mounts.exists(&board.mount) {
                    boards.push(board);
                } else {
                    debug!(mount = %board.mount, id = %board.id, "volume not present, skipping");
                }
            }
            Err(err) => {
                debug!(key = %device.key, %err, "skipping malformed device record");
            }
        }
    }
    trace!(?boards, "connected boards");
    Ok(boards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn record(key: &str, description: &str) -> DosDevice {
        DosDevice {
            key: key.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_extracts_mount_and_id() {
        let extractor = Extractor::new();
        let device = record(
            r"\DosDevices\E:",
            r"\??\USBSTOR#Disk&Ven_MBED&Prod_microcontroller#0200020113F4A2A569556DD7&0",
        );
        let board = extractor.extract(&device).unwrap();
        assert_eq!(board.mount, "E:");
        assert_eq!(board.id, "0200020113F4A2A569556DD7");
    }

    #[test_case(r"\DosDevices\E:" ; "no identifier run")]
    #[test_case(r"short 0200" ; "identifier too short")]
    fn test_description_without_id_is_malformed(description: &str) {
        let extractor = Extractor::new();
        let err = extractor
            .extract(&record(r"\DosDevices\E:", description))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn test_key_without_drive_letter_is_malformed() {
        let extractor = Extractor::new();
        let err = extractor
            .extract(&record(
                r"#{guid}volume",
                "Ven_MBED 0200020113F4A2A569556DD7",
            ))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn test_identifier_is_first_long_hex_run() {
        let extractor = Extractor::new();
        // Shorter hex-ish runs ("Disk", "MBED") must not win.
        let board = extractor
            .extract(&record(
                r"\DosDevices\F:",
                "usb-MBED_microcontroller_066EFF534951775087215736-0:0",
            ))
            .unwrap();
        assert_eq!(board.id, "066EFF534951775087215736");
    }

    #[test]
    fn test_vendor_filter_is_case_insensitive() {
        let devices = vec![
            record(r"\DosDevices\E:", "Ven_MBED storage"),
            record(r"\DosDevices\F:", "ven_mbed storage"),
            record(r"\DosDevices\G:", "Ven_SanDisk storage"),
        ];
        let kept = mbed_devices(devices);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|d| d.key != r"\DosDevices\G:"));
    }
}
