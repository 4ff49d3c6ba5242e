//! Line classification and operand parsing.

use std::fmt;

/// What a single source line contributes to a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `name:` at column 0. Anything after the colon is ignored.
    Label(&'a str),
    /// Indented `MNEMONIC operand...`.
    Instr {
        mnemonic: &'a str,
        operands: Vec<&'a str>,
    },
    /// Blank, comment-only or otherwise unrecognised.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandError {
    Missing,
    Malformed(String),
    OutOfRange { value: u32, bytes: usize },
}

impl fmt::Display for OperandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandError::Missing => write!(f, "missing operand"),
            OperandError::Malformed(tok) => write!(f, "cannot parse operand `{tok}`"),
            OperandError::OutOfRange { value, bytes } => {
                write!(f, "value {value} does not fit in {bytes} byte(s)")
            }
        }
    }
}

fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn classify(raw: &str) -> Line<'_> {
    let line = match raw.find(';') {
        Some(p) => &raw[..p],
        None => raw,
    };

    let word_len = line.find(|c: char| !is_word(c)).unwrap_or(line.len());
    if word_len > 0 {
        return if line[word_len..].starts_with(':') {
            Line::Label(&line[..word_len])
        } else {
            Line::Other
        };
    }

    let body = line.trim_start();
    if body.len() == line.len() || !body.starts_with(is_word) {
        return Line::Other;
    }
    let mut tokens = body.split_whitespace();
    match tokens.next() {
        Some(mnemonic) => Line::Instr {
            mnemonic,
            operands: tokens.collect(),
        },
        None => Line::Other,
    }
}

/// Parses `#$hex` or `#decimal` into a value that fits in `bytes` bytes.
pub fn immediate(tok: Option<&str>, bytes: usize) -> Result<u16, OperandError> {
    let tok = tok.ok_or(OperandError::Missing)?;
    let (digits, radix) = if let Some(hex) = tok.strip_prefix("#$") {
        (hex, 16)
    } else if let Some(dec) = tok.strip_prefix('#') {
        (dec, 10)
    } else {
        return Err(OperandError::Malformed(tok.to_string()));
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(OperandError::Malformed(tok.to_string()));
    }
    let value = u32::from_str_radix(digits, radix)
        .map_err(|_| OperandError::Malformed(tok.to_string()))?;
    if value >= 1u32 << (8 * bytes) {
        return Err(OperandError::OutOfRange { value, bytes });
    }
    Ok(value as u16)
}

/// Parses `@label` and returns the label name.
pub fn label_ref(tok: Option<&str>) -> Result<&str, OperandError> {
    let tok = tok.ok_or(OperandError::Missing)?;
    match tok.strip_prefix('@') {
        Some(name) if !name.is_empty() && name.chars().all(is_word) => Ok(name),
        _ => Err(OperandError::Malformed(tok.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labels_need_column_zero_and_a_colon() {
        assert_eq!(classify("loop:"), Line::Label("loop"));
        assert_eq!(classify("loop: LDA #1"), Line::Label("loop"));
        assert_eq!(classify("loop"), Line::Other);
        assert_eq!(classify(" loop:"), Line::Instr { mnemonic: "loop:", operands: vec![] });
    }

    #[test]
    fn instructions_need_leading_whitespace() {
        assert_eq!(
            classify("\tLDA   #$2A"),
            Line::Instr { mnemonic: "LDA", operands: vec!["#$2A"] }
        );
        assert_eq!(classify("LDA #1"), Line::Other);
        assert_eq!(classify("   "), Line::Other);
        assert_eq!(classify(""), Line::Other);
        assert_eq!(classify("  ,X"), Line::Other);
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(
            classify("    STA ,X ; write the cell"),
            Line::Instr { mnemonic: "STA", operands: vec![",X"] }
        );
        assert_eq!(classify("; header"), Line::Other);
        assert_eq!(classify("start: ; entry"), Line::Label("start"));
    }

    #[test]
    fn immediates_in_both_radixes() {
        assert_eq!(immediate(Some("#$2A"), 1), Ok(0x2A));
        assert_eq!(immediate(Some("#$a000"), 2), Ok(0xA000));
        assert_eq!(immediate(Some("#42"), 1), Ok(42));
        assert_eq!(immediate(Some("#65535"), 2), Ok(65535));
    }

    #[test]
    fn bad_immediates_are_reported() {
        assert_eq!(immediate(None, 1), Err(OperandError::Missing));
        assert_eq!(immediate(Some("42"), 1), Err(OperandError::Malformed("42".into())));
        assert_eq!(immediate(Some("#$"), 1), Err(OperandError::Malformed("#$".into())));
        assert_eq!(immediate(Some("#-1"), 1), Err(OperandError::Malformed("#-1".into())));
        assert_eq!(immediate(Some("#4x"), 1), Err(OperandError::Malformed("#4x".into())));
        assert_eq!(
            immediate(Some("#256"), 1),
            Err(OperandError::OutOfRange { value: 256, bytes: 1 })
        );
        assert_eq!(
            immediate(Some("#99999999999"), 2),
            Err(OperandError::Malformed("#99999999999".into()))
        );
        assert_eq!(
            immediate(Some("#$123456789"), 2),
            Err(OperandError::Malformed("#$123456789".into()))
        );
    }

    #[test]
    fn label_references() {
        assert_eq!(label_ref(Some("@loop_1")), Ok("loop_1"));
        assert_eq!(label_ref(Some("loop")), Err(OperandError::Malformed("loop".into())));
        assert_eq!(label_ref(Some("@")), Err(OperandError::Malformed("@".into())));
    }
}
