use serde::{Deserialize, Serialize};

use crate::decoder::Op;

/// How an instruction's operand is encoded after the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddrMode {
    Implied,
    Imm8,
    Imm16,
    /// Two-byte offset from the program start.
    Addr16,
    /// `STA ,X`: no operand bytes, the address comes from X.
    IndirectX,
}

impl AddrMode {
    pub fn width(self) -> u16 {
        match self {
            AddrMode::Implied | AddrMode::IndirectX => 1,
            AddrMode::Imm8 => 2,
            AddrMode::Imm16 | AddrMode::Addr16 => 3,
        }
    }
}

/// All opcodes in encoding order.
pub const TABLE: &[Op] = &[
    Op::Lda,
    Op::Ldx,
    Op::StaX,
    Op::End,
    Op::Cmpa,
    Op::Cmpb,
    Op::Cmpx,
    Op::Cmpy,
    Op::Cmpd,
    Op::Jmp,
    Op::Jeq,
    Op::Jne,
    Op::Jgt,
    Op::Jlt,
    Op::Inca,
    Op::Incb,
    Op::Incx,
    Op::Incy,
    Op::Incd,
    Op::Deca,
    Op::Decb,
    Op::Decx,
    Op::Decy,
    Op::Decd,
    Op::Ldb,
    Op::Ldy,
];

impl Op {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Lda => "LDA",
            Op::Ldx => "LDX",
            Op::StaX => "STA",
            Op::End => "END",
            Op::Cmpa => "CMPA",
            Op::Cmpb => "CMPB",
            Op::Cmpx => "CMPX",
            Op::Cmpy => "CMPY",
            Op::Cmpd => "CMPD",
            Op::Jmp => "JMP",
            Op::Jeq => "JEQ",
            Op::Jne => "JNE",
            Op::Jgt => "JGT",
            Op::Jlt => "JLT",
            Op::Inca => "INCA",
            Op::Incb => "INCB",
            Op::Incx => "INCX",
            Op::Incy => "INCY",
            Op::Incd => "INCD",
            Op::Deca => "DECA",
            Op::Decb => "DECB",
            Op::Decx => "DECX",
            Op::Decy => "DECY",
            Op::Decd => "DECD",
            Op::Ldb => "LDB",
            Op::Ldy => "LDY",
        }
    }

    pub fn mode(self) -> AddrMode {
        match self {
            Op::Lda | Op::Ldb | Op::Cmpa | Op::Cmpb => AddrMode::Imm8,
            Op::Ldx | Op::Ldy | Op::Cmpx | Op::Cmpy | Op::Cmpd => AddrMode::Imm16,
            Op::Jmp | Op::Jeq | Op::Jne | Op::Jgt | Op::Jlt => AddrMode::Addr16,
            Op::StaX => AddrMode::IndirectX,
            _ => AddrMode::Implied,
        }
    }

    /// Case-insensitive mnemonic lookup.
    pub fn from_mnemonic(name: &str) -> Option<Op> {
        TABLE
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }
}
