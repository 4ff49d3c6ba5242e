//! Two-pass assembler for B32 source.
//!
//! Pass 1 walks the source and records each label against the byte offset it
//! precedes. Pass 2 walks it again and emits code, resolving `@label`
//! operands from the now complete table. Every instruction has a fixed width
//! regardless of its operand, so no backpatching is needed.
//!
//! ```text
//! start:
//!     LDX #$A000      ; first display cell
//!     LDA #65         ; 'A'
//! loop:
//!     STA ,X
//!     INCX
//!     INCX
//!     CMPX #$A010
//!     JLT @loop
//!     END
//! ```

pub mod parse;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use b32_rs::decoder::Op;
use b32_rs::instructions::AddrMode;
use b32_rs::{Image, DEFAULT_ORIGIN};

use parse::{Line, OperandError};

/// A problem that does not stop assembly. The image is still produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnknownMnemonic(String),
    MalformedOperand { mnemonic: &'static str, error: OperandError },
    DuplicateLabel(String),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.line)?;
        match &self.kind {
            DiagnosticKind::UnknownMnemonic(m) => write!(f, "unrecognized instruction {m}"),
            DiagnosticKind::MalformedOperand { mnemonic, error } => write!(f, "{mnemonic}: {error}"),
            DiagnosticKind::DuplicateLabel(l) => write!(f, "label {l} redefined"),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: undefined label {label}")]
    UndefinedLabel { line: usize, label: String },
    #[error("line {line}: program exceeds 64 KiB")]
    ProgramTooLarge { line: usize },
}

/// Label entry as written by `--labels-out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelOut {
    pub name: String,
    pub offset: u16,
    pub addr: u16,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub image: Image,
    pub labels: BTreeMap<String, u16>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Assembly {
    /// True when assembly produced no diagnostics at all.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn label_table(&self) -> Vec<LabelOut> {
        self.labels
            .iter()
            .map(|(name, &offset)| LabelOut {
                name: name.clone(),
                offset,
                addr: self.image.start.wrapping_add(offset),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Collect,
    Emit,
}

#[derive(Debug, Clone)]
pub struct Assembler {
    origin: u16,
    labels: BTreeMap<String, u16>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN)
    }
}

impl Assembler {
    /// `origin` becomes both the load and the entry address of the image.
    pub fn new(origin: u16) -> Self {
        Self {
            origin,
            labels: BTreeMap::new(),
        }
    }

    pub fn assemble(&mut self, source: &str) -> Result<Assembly, AsmError> {
        self.labels.clear();
        let mut diagnostics = Vec::new();
        let mut code = Vec::new();

        let len = self.pass(source, Pass::Collect, &mut code, &mut diagnostics)?;
        code.reserve(len);
        self.pass(source, Pass::Emit, &mut code, &mut diagnostics)?;
        debug_assert_eq!(code.len(), len);

        debug!(
            bytes = code.len(),
            labels = self.labels.len(),
            diagnostics = diagnostics.len(),
            "assembled"
        );
        Ok(Assembly {
            image: Image::new(self.origin, code),
            labels: self.labels.clone(),
            diagnostics,
        })
    }

    /// Returns the number of bytes the pass accounted for.
    fn pass(
        &mut self,
        source: &str,
        pass: Pass,
        out: &mut Vec<u8>,
        diags: &mut Vec<Diagnostic>,
    ) -> Result<usize, AsmError> {
        let mut cursor = 0usize;
        for (idx, raw) in source.lines().enumerate() {
            let line = idx + 1;
            match parse::classify(raw) {
                Line::Label(name) => {
                    if pass == Pass::Collect {
                        let offset = u16::try_from(cursor)
                            .map_err(|_| AsmError::ProgramTooLarge { line })?;
                        if self.labels.insert(name.to_string(), offset).is_some() {
                            report(diags, line, DiagnosticKind::DuplicateLabel(name.to_string()));
                        }
                    }
                }
                Line::Instr { mnemonic, operands } => {
                    let Some(op) = Op::from_mnemonic(mnemonic) else {
                        if pass == Pass::Emit {
                            report(diags, line, DiagnosticKind::UnknownMnemonic(mnemonic.to_string()));
                        }
                        continue;
                    };
                    cursor += op.mode().width() as usize;
                    if cursor > 1 << 16 {
                        return Err(AsmError::ProgramTooLarge { line });
                    }
                    if pass == Pass::Emit {
                        self.encode(op, operands.first().copied(), line, out, diags)?;
                    }
                }
                Line::Other => {}
            }
        }
        Ok(cursor)
    }

    fn encode(
        &self,
        op: Op,
        operand: Option<&str>,
        line: usize,
        out: &mut Vec<u8>,
        diags: &mut Vec<Diagnostic>,
    ) -> Result<(), AsmError> {
        let mut malformed = |error: OperandError| {
            report(
                diags,
                line,
                DiagnosticKind::MalformedOperand {
                    mnemonic: op.mnemonic(),
                    error,
                },
            )
        };

        match op.mode() {
            AddrMode::Implied => out.push(op.code()),
            AddrMode::IndirectX => match operand {
                Some(tok) if tok.eq_ignore_ascii_case(",X") => out.push(op.code()),
                _ => {
                    // 0x00 is not an opcode; the processor rejects it at run time.
                    debug!(line, ?operand, "STA without ,X");
                    out.push(0x00);
                }
            },
            AddrMode::Imm8 => {
                let value = parse::immediate(operand, 1).unwrap_or_else(|e| {
                    malformed(e);
                    0
                });
                out.push(op.code());
                out.push(value as u8);
            }
            AddrMode::Imm16 => {
                let value = parse::immediate(operand, 2).unwrap_or_else(|e| {
                    malformed(e);
                    0
                });
                out.push(op.code());
                out.extend_from_slice(&value.to_be_bytes());
            }
            AddrMode::Addr16 => {
                let offset = match parse::label_ref(operand) {
                    Ok(name) => *self.labels.get(name).ok_or_else(|| AsmError::UndefinedLabel {
                        line,
                        label: name.to_string(),
                    })?,
                    Err(e) => {
                        malformed(e);
                        0
                    }
                };
                out.push(op.code());
                out.extend_from_slice(&offset.to_be_bytes());
            }
        }
        Ok(())
    }
}

fn report(diags: &mut Vec<Diagnostic>, line: usize, kind: DiagnosticKind) {
    let d = Diagnostic { line, kind };
    warn!("{d}");
    diags.push(d);
}

/// Assembles with the default origin.
pub fn assemble(source: &str) -> Result<Assembly, AsmError> {
    Assembler::default().assemble(source)
}
