//! Decode registry binary values to readable device strings.

/// Decode a mounted-device binary blob to an ASCII string.
///
/// The blob is UTF-16-LE-like with only the low byte of each code unit
/// meaningful, so every odd-indexed byte is dropped. Any retained byte
/// >= 128 is skipped outright rather than transcoded; non-ASCII device
/// descriptions lose those characters. That loss is accepted: the fields
/// discovery extracts (vendor marker, hex identifier) are ASCII.
pub fn decode_device_string(raw: &[u8]) -> String {
    raw.iter()
        .step_by(2)
        .filter(|&&b| b < 128)
        .map(|&b| b as char)
        .collect()
}
