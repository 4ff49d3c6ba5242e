use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hex;

/// Leading magic of every executable, as literal text.
pub const MAGIC: &str = "B32";
/// Load and entry address the assembler uses unless told otherwise.
pub const DEFAULT_ORIGIN: u16 = 4096;

// "B32" + start (4 digits) + entry (4 digits)
const HEADER_LEN: usize = MAGIC.len() + 8;

/// A B32 executable: load address, entry address and the code bytes.
///
/// The text form is `B32` followed by the two addresses and the code, every
/// byte written as two uppercase hex digits with multi-byte fields big-endian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub start: u16,
    pub entry: u16,
    pub code: Vec<u8>,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    #[error("not a valid B32 executable (missing magic)")]
    BadMagic,
    #[error("truncated header: {len} characters")]
    Truncated { len: usize },
    #[error("invalid hex in {field} at character {offset}")]
    InvalidHex { field: &'static str, offset: usize },
}

impl Image {
    pub fn new(origin: u16, code: Vec<u8>) -> Self {
        Self {
            start: origin,
            entry: origin,
            code,
        }
    }

    /// Address one past the last code byte once loaded.
    pub fn end(&self) -> usize {
        self.start as usize + self.code.len()
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::with_capacity(HEADER_LEN + self.code.len() * 2);
        out.push_str(MAGIC);
        hex::push_be(&mut out, self.start as u32, 2);
        hex::push_be(&mut out, self.entry as u32, 2);
        out.push_str(&hex::encode(&self.code));
        f.write_str(&out)
    }
}

impl FromStr for Image {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_end();
        if !s.starts_with(MAGIC) {
            return Err(ImageError::BadMagic);
        }
        if s.len() < HEADER_LEN {
            return Err(ImageError::Truncated { len: s.len() });
        }
        let start = s.get(3..7).and_then(hex::parse_u16).ok_or(ImageError::InvalidHex {
            field: "start address",
            offset: 3,
        })?;
        let entry = s.get(7..11).and_then(hex::parse_u16).ok_or(ImageError::InvalidHex {
            field: "entry address",
            offset: 7,
        })?;
        let code = hex::decode(&s[HEADER_LEN..]).map_err(|off| ImageError::InvalidHex {
            field: "code",
            offset: HEADER_LEN + off,
        })?;
        Ok(Self { start, entry, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_form_matches_header_layout() {
        let img = Image::new(DEFAULT_ORIGIN, vec![0x01, 0x2A, 0x04]);
        assert_eq!(img.to_string(), "B3210001000012A04");
        assert_eq!(img.to_string().parse::<Image>().unwrap(), img);
    }

    #[test]
    fn rejects_wrong_magic_before_anything_else() {
        assert_eq!("X3210001000".parse::<Image>(), Err(ImageError::BadMagic));
        assert_eq!("".parse::<Image>(), Err(ImageError::BadMagic));
    }

    #[test]
    fn reports_offset_of_bad_code_digit() {
        let err = "B321000100001ZZ".parse::<Image>().unwrap_err();
        assert_eq!(
            err,
            ImageError::InvalidHex {
                field: "code",
                offset: 13
            }
        );
    }

    #[test]
    fn separate_entry_address_is_kept() {
        let img: Image = "B3220002004FF".parse().unwrap();
        assert_eq!(img.start, 0x2000);
        assert_eq!(img.entry, 0x2004);
        assert_eq!(img.code, vec![0xFF]);
        assert_eq!(img.end(), 0x2001);
    }
}
