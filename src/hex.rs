//! Hex text helpers shared by the image format and the assembler.

use std::fmt::Write;

/// Appends `value` as `bytes * 2` uppercase hex digits, big-endian.
pub fn push_be(out: &mut String, value: u32, bytes: usize) {
    let _ = write!(out, "{:0width$X}", value, width = bytes * 2);
}

pub fn encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        push_be(&mut out, *b as u32, 1);
    }
    out
}

/// Decodes hex digit pairs. Returns the byte offset (in characters) of the
/// first bad pair on failure; a trailing odd digit is reported the same way.
pub fn decode(text: &str) -> Result<Vec<u8>, usize> {
    let raw = text.as_bytes();
    let mut out = Vec::with_capacity(raw.len() / 2);
    for (i, pair) in raw.chunks(2).enumerate() {
        let off = i * 2;
        if pair.len() != 2 {
            return Err(off);
        }
        let hi = digit(pair[0]).ok_or(off)?;
        let lo = digit(pair[1]).ok_or(off)?;
        out.push((hi << 4) | lo);
    }
    Ok(out)
}

/// Parses a fixed-width big-endian hex field such as `"1000"`.
pub fn parse_u16(text: &str) -> Option<u16> {
    if text.len() != 4 || !text.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(text, 16).ok()
}

fn digit(c: u8) -> Option<u8> {
    (c as char).to_digit(16).map(|d| d as u8)
}
