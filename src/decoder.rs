use serde::{Deserialize, Serialize};

use crate::cpu::Trap;
use crate::memory::Bus;

/// Every opcode the processor understands, tagged with its encoding byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Op {
    Lda = 0x01,
    Ldx = 0x02,
    StaX = 0x03,
    End = 0x04,
    Cmpa = 0x05,
    Cmpb = 0x06,
    Cmpx = 0x07,
    Cmpy = 0x08,
    Cmpd = 0x09,
    Jmp = 0x0A,
    Jeq = 0x0B,
    Jne = 0x0C,
    Jgt = 0x0D,
    Jlt = 0x0E,
    Inca = 0x0F,
    Incb = 0x10,
    Incx = 0x11,
    Incy = 0x12,
    Incd = 0x13,
    Deca = 0x14,
    Decb = 0x15,
    Decx = 0x16,
    Decy = 0x17,
    Decd = 0x18,
    Ldb = 0x22,
    Ldy = 0x23,
}

impl TryFrom<u8> for Op {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        let op = match byte {
            0x01 => Op::Lda,
            0x02 => Op::Ldx,
            0x03 => Op::StaX,
            0x04 => Op::End,
            0x05 => Op::Cmpa,
            0x06 => Op::Cmpb,
            0x07 => Op::Cmpx,
            0x08 => Op::Cmpy,
            0x09 => Op::Cmpd,
            0x0A => Op::Jmp,
            0x0B => Op::Jeq,
            0x0C => Op::Jne,
            0x0D => Op::Jgt,
            0x0E => Op::Jlt,
            0x0F => Op::Inca,
            0x10 => Op::Incb,
            0x11 => Op::Incx,
            0x12 => Op::Incy,
            0x13 => Op::Incd,
            0x14 => Op::Deca,
            0x15 => Op::Decb,
            0x16 => Op::Decx,
            0x17 => Op::Decy,
            0x18 => Op::Decd,
            0x22 => Op::Ldb,
            0x23 => Op::Ldy,
            other => return Err(other),
        };
        Ok(op)
    }
}

impl Op {
    pub fn code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Op,
    /// Immediate value or label offset; zero for operand-less instructions.
    pub operand: u16,
}

impl Decoded {
    /// Encoded size in bytes, opcode included.
    pub fn width(&self) -> u16 {
        self.op.mode().width()
    }
}

pub trait Decoder {
    fn decode<B: Bus>(&self, bus: &mut B, ip: u16) -> Result<Decoded, Trap>;
}
