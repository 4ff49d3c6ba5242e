use std::fmt;

use anyhow::Error;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::decoder::Decoder;
use crate::disasm::fmt_decoded;
use crate::exec::Executor;
use crate::memory::Bus;

pub const MAXINT_8BIT: i32 = 255;
pub const MAXINT_16BIT: i32 = 65535;
pub const OVERFLOW_8BIT: i32 = 256;
pub const OVERFLOW_16BIT: i32 = 65536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reg {
    A,
    B,
    /// A in the high byte, B in the low byte.
    D,
    X,
    Y,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub a: u8,
    pub b: u8,
    pub x: u16,
    pub y: u16,
}

impl Registers {
    pub fn d(&self) -> u16 {
        u16::from_be_bytes([self.a, self.b])
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compare: u8 {
const EQUAL = 1 << 0;
const NOT_EQUAL = 1 << 1;
const LESS = 1 << 2;
const GREATER = 1 << 3;
}
}

#[derive(thiserror::Error, Debug)]
pub enum Trap {
    #[error("Unknown instruction {opcode:#04x} at {ip:#06x}")]
    UnknownOpcode { ip: u16, opcode: u8 },
    #[error("Bus error at {addr:#06x}: {source}")]
    Bus {
        addr: u16,
        #[source]
        source: Error,
    },
}

/// Result of one executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed,
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub ip: u16,
    pub regs: Registers,
    pub cmp: Compare,
    pub overflow: bool,
    /// Present for the register panel; no instruction touches it.
    pub carry: bool,
    /// Load address of the running image. Jump operands are relative to it.
    pub start: u16,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            ip: 0,
            regs: Registers::default(),
            cmp: Compare::empty(),
            overflow: false,
            carry: false,
            start: 0,
        }
    }

    /// Clears registers and flags and points execution at `entry` of an
    /// image loaded at `start`.
    pub fn reset(&mut self, start: u16, entry: u16) {
        *self = Self::new();
        self.start = start;
        self.ip = entry;
    }

    pub fn get_reg(&self, reg: Reg) -> u16 {
        match reg {
            Reg::A => self.regs.a as u16,
            Reg::B => self.regs.b as u16,
            Reg::D => self.regs.d(),
            Reg::X => self.regs.x,
            Reg::Y => self.regs.y,
        }
    }

    /// Writes `value` into `reg`, wrapping it into the register's width.
    ///
    /// Overflow is raised only when `value` is above the width's maximum;
    /// negative values wrap upward and leave it clear.
    pub fn set_reg(&mut self, reg: Reg, value: i32) {
        match reg {
            Reg::A | Reg::B => {
                self.overflow = value > MAXINT_8BIT;
                let v = value.rem_euclid(OVERFLOW_8BIT) as u8;
                if reg == Reg::A {
                    self.regs.a = v;
                } else {
                    self.regs.b = v;
                }
            }
            Reg::D => {
                self.overflow = value > MAXINT_16BIT;
                let [a, b] = (value.rem_euclid(OVERFLOW_16BIT) as u16).to_be_bytes();
                self.regs.a = a;
                self.regs.b = b;
            }
            Reg::X | Reg::Y => {
                self.overflow = value > MAXINT_16BIT;
                let v = value.rem_euclid(OVERFLOW_16BIT) as u16;
                if reg == Reg::X {
                    self.regs.x = v;
                } else {
                    self.regs.y = v;
                }
            }
        }
    }

    /// Recomputes the comparison set from `reg` against an immediate.
    pub fn compare(&mut self, reg: Reg, value: u16) {
        let r = self.get_reg(reg);
        self.cmp = Compare::empty();
        self.cmp.set(Compare::EQUAL, r == value);
        self.cmp.set(Compare::NOT_EQUAL, r != value);
        self.cmp.set(Compare::LESS, r < value);
        self.cmp.set(Compare::GREATER, r > value);
    }

    /// Jumps to a label offset within the loaded program.
    pub fn jump(&mut self, offset: u16) {
        self.ip = self.start.wrapping_add(offset);
    }

    pub fn snapshot(&self) -> RegisterSnapshot {
        RegisterSnapshot {
            a: self.regs.a,
            b: self.regs.b,
            d: self.regs.d(),
            x: self.regs.x,
            y: self.regs.y,
            cmp: self.cmp.bits(),
            ip: self.ip,
            of: self.overflow as u8,
            cy: self.carry as u8,
        }
    }

    /// Fetches, decodes and executes one instruction.
    ///
    /// Faults leave IP on the faulting instruction.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<Step, Trap> {
        let ip = self.ip;
        let d = dec.decode(bus, ip)?;
        trace!("{:#06x}: {}", ip, fmt_decoded(&d));
        self.ip = ip.wrapping_add(d.width());
        match exec.exec(self, bus, d) {
            Ok(step) => Ok(step),
            Err(trap) => {
                self.ip = ip;
                Err(trap)
            }
        }
    }
}

/// Register and flag values handed to the host after each instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSnapshot {
    pub a: u8,
    pub b: u8,
    pub d: u16,
    pub x: u16,
    pub y: u16,
    pub cmp: u8,
    pub ip: u16,
    pub of: u8,
    pub cy: u8,
}

impl fmt::Display for RegisterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A=${:02X} B=${:02X} D=${:04X} X=${:04X} Y=${:04X} CMP=${:02X} IP=${:04X} OF=${:02X} CY=${:02X}",
            self.a, self.b, self.d, self.x, self.y, self.cmp, self.ip, self.of, self.cy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn d_is_composed_from_a_and_b() {
        let mut cpu = Cpu::new();
        cpu.set_reg(Reg::A, 0x12);
        cpu.set_reg(Reg::B, 0x34);
        assert_eq!(cpu.get_reg(Reg::D), 0x1234);
    }

    #[test]
    fn snapshot_display_uses_dollar_hex() {
        let mut cpu = Cpu::new();
        cpu.reset(0x1000, 0x1000);
        cpu.set_reg(Reg::A, 10);
        cpu.compare(Reg::A, 10);
        assert_eq!(
            cpu.snapshot().to_string(),
            "A=$0A B=$00 D=$0A00 X=$0000 Y=$0000 CMP=$01 IP=$1000 OF=$00 CY=$00"
        );
    }
}
