//! Textual report rendering.
//!
//! Fixed-width table, one row per board, absent fields rendered blank.
//! Rendering builds a `String` so the layout is testable; the binary
//! decides where it goes.

use crate::discovery::BoardRecord;
use std::fmt::Write;

const COL_MOUNT: usize = 6;
const COL_ID: usize = 37;
const COL_PORT: usize = 4;
const COL_BOARD: usize = 12;

/// Render the discovery result as a table with a header row.
pub fn render_table(records: &[BoardRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<COL_MOUNT$} {:<COL_ID$} {:<COL_PORT$} {:>COL_BOARD$}",
        "Mount", "Mbed ID", "Port", "Mbed board",
    );
    let _ = writeln!(
        out,
        "{}",
        "-".repeat(COL_MOUNT + COL_ID + COL_PORT + COL_BOARD + 3)
    );
    for record in records {
        let _ = writeln!(
            out,
            "{:<COL_MOUNT$} {:<COL_ID$} {:>COL_PORT$} {:>COL_BOARD$}",
            record.mount,
            record.id,
            record.port.as_deref().unwrap_or(""),
            record.board.as_deref().unwrap_or(""),
        );
    }
    out
}
