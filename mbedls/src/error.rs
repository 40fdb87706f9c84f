//! Common error types for mbedls.
//!
//! This module provides a centralized Error enum using thiserror,
//! with conversions from underlying error types used throughout the crate.
//!
//! Only `MountedDevices` is ever fatal to a discovery pass: the mounted
//! devices enumeration is the root of everything else, so losing it means
//! there is nothing meaningful to report. Every other lookup failure during
//! discovery is folded into an empty field on a board record.

use crate::registry::RegistryError;
use thiserror::Error;

/// Main error type for mbedls operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The mounted-devices registry root could not be read. Fatal.
    #[error("mounted devices registry unavailable: {0}")]
    MountedDevices(#[source] RegistryError),

    /// A device record failed required pattern extraction.
    ///
    /// During discovery these are dropped with a diagnostic rather than
    /// propagated; the variant exists so extraction is testable and so the
    /// binary can report a distinct exit code if one ever surfaces as fatal.
    #[error("malformed device record: {0}")]
    MalformedRecord(String),

    /// Board catalog could not be loaded or parsed.
    #[error("board catalog error: {0}")]
    Catalog(String),

    /// Discovery is not available on this platform.
    #[error("board discovery requires the Windows device registry")]
    Unsupported,
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
