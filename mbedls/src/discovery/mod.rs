//! Board discovery pipeline.
//!
//! One synchronous pass over the device registry: enumerate mounted
//! storage devices, narrow to the vendor's boards that are actually
//! present, then enrich each with its serial port and board model. Port
//! and model are independent best-effort lookups; either may stay unset
//! on a perfectly healthy board.

pub mod decode;
pub mod devices;
pub mod ports;

use crate::catalog::BoardCatalog;
use crate::error::Result;
use crate::registry::{DeviceRegistry, USB_ENUM_PATH};
use crate::tracing::prelude::*;
use serde::Serialize;

pub use devices::{FsMountCheck, MountCheck};

/// One discovered board.
///
/// `mount` and `id` are always non-empty; they are the discovery key.
/// `port` and `board` are enrichments that legitimately may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardRecord {
    /// Mass-storage mount point, e.g. `E:`.
    pub mount: String,
    /// Device instance identifier from the USB descriptor.
    pub id: String,
    /// Serial communication port, e.g. `COM3`, when one was resolved.
    pub port: Option<String>,
    /// Board model name, when the identifier is in the catalog.
    pub board: Option<String>,
}

/// Discover all connected boards, in device-enumeration order.
///
/// Returns an empty list when no boards are connected; errors only when
/// the mounted-devices enumeration itself is unavailable. The USB
/// enumeration tree being unavailable is not fatal, it just leaves every
/// port unset.
pub fn discover<R, M>(
    registry: &R,
    mounts: &M,
    catalog: &BoardCatalog,
) -> Result<Vec<BoardRecord>>
where
    R: DeviceRegistry,
    M: MountCheck,
{
    let connected = devices::connected_boards(registry, mounts)?;

    let usb = match registry.open(USB_ENUM_PATH) {
        Ok(key) => Some(key),
        Err(err) => {
            debug!(%err, "USB enumeration tree unavailable, ports will be unset");
            None
        }
    };

    let records: Vec<BoardRecord> = connected
        .into_iter()
        .map(|device| {
            let port = usb
                .as_ref()
                .and_then(|usb| ports::resolve_port(usb, &device.id));
            let board = catalog.resolve(&device.id).map(str::to_string);
            BoardRecord {
                mount: device.mount,
                id: device.id,
                port,
                board,
            }
        })
        .collect();

    info!(count = records.len(), "discovery pass complete");
    Ok(records)
}
