//! mbedls: discover USB-attached mbed development boards.
//!
//! Reads the Windows device registry to locate connected mbed boards and
//! resolve, per board, the mass-storage mount point, the serial
//! communication port, and the board model. The heart of the crate is
//! [`discovery::discover`], which runs one synchronous snapshot pass; the
//! registry is abstracted behind [`registry::DeviceRegistry`] so the
//! pipeline also runs against the in-memory fixture in
//! [`registry::memory`].

pub mod catalog;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod report;
pub mod tracing;

pub use catalog::BoardCatalog;
pub use discovery::{discover, BoardRecord, FsMountCheck, MountCheck};
pub use error::{Error, Result};
