//! Known-board catalog.
//!
//! Maps registered device identifier strings to board model names. The
//! built-in table covers the boards the tool has been used with; a JSON
//! file of the same shape can replace it at runtime:
//!
//! ```json
//! {
//!     "KL25Z": ["usb-MBED_microcontroller_0200020113F4A2A569556DD7-0:0"],
//!     "LPC1549": ["usb-MBED_microcontroller_154902021F5F41C12038C5B5-0:0"]
//! }
//! ```
//!
//! Matching policy: a discovered identifier resolves to a board when any
//! of that board's registered strings contains the identifier as a
//! substring. A fixed-length prefix match was considered instead, but the
//! NUCLEO family shares 4-character identifier prefixes, so prefix keys
//! cannot distinguish them; substring matching against the full
//! registered string can.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Read-only board identity table, loaded once per process.
#[derive(Debug, Clone)]
pub struct BoardCatalog {
    // Sorted by board name so resolution order is deterministic.
    boards: BTreeMap<String, Vec<String>>,
}

impl BoardCatalog {
    /// The compiled-in table of known boards.
    pub fn builtin() -> Self {
        let defs: &[(&str, &[&str])] = &[
            ("KL46Z", &["usb-MBED_micsrocontroller_02200201E6761E7B1B88E3A3-0:0"]),
            ("KL25Z", &["usb-MBED_microcontroller_0200020113F4A2A569556DD7-0:0"]),
            ("NUCLEO_L152RE", &["usb-MBED_microcontroller_066EFF534951775087215736-0:0"]),
            ("NUCLEO_F302R8", &["usb-MBED_microcontroller_066EFF525257775087141721-0:0"]),
            ("NUCLEO_F401RE", &["usb-MBED_microcontroller_066EFF534951775087061841-0:0"]),
            ("NUCLEO_F030R8", &["usb-MBED_microcontroller_066CFF534951775087112139-0:0"]),
            ("NUCLEO_F103RB", &["usb-MBED_microcontroller_066EFF534951775087124315-0:0"]),
            ("NUCLEO_L053R8", &["usb-MBED_microcontroller_066FFF525257775087155144-0:0"]),
            ("LPC11U24", &["usb-MBED_MBED_CMSIS-DAP_A000000001-0:0"]),
            ("LPC1768", &["usb-MBED_microcontrolleur_10105a42e87da33c103dccfb6bc235360a97-0:0"]),
            ("LPC2368", &["usb-mbed_Microcontroller_100000000000000000000002F7F092F4-0:0"]),
            ("LPC11U68", &["usb-MBED_microcontroller_116802021D4C8D9A222B0DCF-0:0"]),
            (
                "LPC1549",
                &[
                    "usb-MBED_microcontroller_154902021F5F41C12038C5B5-0:0",
                    "usb-MBED_microcontroller_154902021A4D7483252AF0F7-0:0",
                ],
            ),
            (
                "LPC812",
                &[
                    "usb-MBED_microcontroller_10500200E72F934C9D8F4E6E-0:0",
                    "usb-MBED_microcontrolleur_10500200FE37FA0C8497272E-0:0",
                ],
            ),
        ];
        Self {
            boards: defs
                .iter()
                .map(|(board, ids)| {
                    (board.to_string(), ids.iter().map(|s| s.to_string()).collect())
                })
                .collect(),
        }
    }

    /// Load a catalog from a JSON file of board name to registered
    /// identifier strings.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Catalog(format!("{}: {e}", path.display())))?;
        let boards: BTreeMap<String, Vec<String>> = serde_json::from_str(&text)
            .map_err(|e| Error::Catalog(format!("{}: {e}", path.display())))?;
        if boards.is_empty() {
            return Err(Error::Catalog(format!(
                "{}: catalog has no boards",
                path.display()
            )));
        }
        Ok(Self { boards })
    }

    /// Resolve a discovered identifier to a board model name.
    pub fn resolve(&self, identifier: &str) -> Option<&str> {
        if identifier.is_empty() {
            return None;
        }
        for (board, registered) in &self.boards {
            if registered.iter().any(|id| id.contains(identifier)) {
                return Some(board);
            }
        }
        None
    }

    /// Number of boards in the catalog.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("0200020113F4A2A569556DD7", Some("KL25Z"))]
    #[test_case("066EFF534951775087215736", Some("NUCLEO_L152RE"))]
    #[test_case("A000000001", Some("LPC11U24"))]
    #[test_case("154902021A4D7483252AF0F7", Some("LPC1549"); "second registered id")]
    #[test_case("FFFFFFFFFFFFFFFF", None; "unknown identifier")]
    fn test_builtin_resolution(id: &str, expected: Option<&str>) {
        assert_eq!(BoardCatalog::builtin().resolve(id), expected);
    }

    #[test]
    fn test_nucleo_family_disambiguated_by_full_id() {
        // The NUCLEO boards share the 066E identifier prefix; full-string
        // matching still tells them apart.
        let catalog = BoardCatalog::builtin();
        assert_eq!(
            catalog.resolve("066EFF525257775087141721"),
            Some("NUCLEO_F302R8")
        );
        assert_eq!(
            catalog.resolve("066EFF534951775087061841"),
            Some("NUCLEO_F401RE")
        );
    }

    #[test]
    fn test_empty_identifier_never_matches() {
        assert_eq!(BoardCatalog::builtin().resolve(""), None);
    }

    #[test]
    fn test_json_catalog_load() {
        let dir = std::env::temp_dir();
        let path = dir.join("mbedls-test-catalog.json");
        std::fs::write(
            &path,
            r#"{"MYBOARD": ["usb-VENDOR_thing_00DEADBEEF00-0:0"]}"#,
        )
        .unwrap();
        let catalog = BoardCatalog::from_json_file(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve("00DEADBEEF00"), Some("MYBOARD"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_json_catalog_rejects_empty() {
        let dir = std::env::temp_dir();
        let path = dir.join("mbedls-test-empty-catalog.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(matches!(
            BoardCatalog::from_json_file(&path),
            Err(Error::Catalog(_))
        ));
        std::fs::remove_file(&path).ok();
    }
}
