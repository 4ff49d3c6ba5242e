use anyhow::anyhow;

use crate::cpu::Trap;
use crate::decoder::{Decoded, Decoder, Op};
use crate::instructions::AddrMode;
use crate::memory::Bus;

/// Decoder for the B32 byte encoding: one opcode byte followed by zero, one
/// or two big-endian operand bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct B32Decoder;

impl B32Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for B32Decoder {
    fn decode<B: Bus>(&self, bus: &mut B, ip: u16) -> Result<Decoded, Trap> {
        let opcode = bus
            .read_u8(ip)
            .map_err(|source| Trap::Bus { addr: ip, source })?;
        let op = Op::try_from(opcode).map_err(|opcode| Trap::UnknownOpcode { ip, opcode })?;
        if op.mode().width() == 1 {
            return Ok(Decoded { op, operand: 0 });
        }
        let at = ip.checked_add(1).ok_or_else(|| Trap::Bus {
            addr: ip,
            source: anyhow!("operand past the top of the address space"),
        })?;
        let operand = match op.mode() {
            AddrMode::Implied | AddrMode::IndirectX => 0,
            AddrMode::Imm8 => bus
                .read_u8(at)
                .map_err(|source| Trap::Bus { addr: at, source })? as u16,
            AddrMode::Imm16 | AddrMode::Addr16 => bus
                .read_u16(at)
                .map_err(|source| Trap::Bus { addr: at, source })?,
        };
        Ok(Decoded { op, operand })
    }
}
