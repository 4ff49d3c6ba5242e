use std::cell::RefCell;
use std::ops::RangeInclusive;
use std::rc::Rc;

use anyhow::{anyhow, Result};

pub trait Bus {
    fn read_u8(&mut self, addr: u16) -> Result<u8>;
    /// Big-endian, as every multi-byte field in a B32 image.
    fn read_u16(&mut self, addr: u16) -> Result<u16>;
    fn write_u8(&mut self, addr: u16, val: u8) -> Result<()>;
}

/// Something that receives writes to a mapped address range.
pub trait Peripheral {
    fn poke(&mut self, addr: u16, value: u8);
}

impl<P: Peripheral + ?Sized> Peripheral for Rc<RefCell<P>> {
    fn poke(&mut self, addr: u16, value: u8) {
        self.borrow_mut().poke(addr, value);
    }
}

struct Mapping {
    range: RangeInclusive<u16>,
    device: Box<dyn Peripheral>,
}

/// Flat byte-addressable RAM with non-exclusive peripheral mappings.
///
/// Writes reach every mapping whose range holds the address, in the order the
/// mappings were registered, and are then stored in RAM regardless.
pub struct Memory {
    mem: Vec<u8>,
    maps: Vec<Mapping>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size],
            maps: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.mem.len()
    }

    pub fn map<P: Peripheral + 'static>(&mut self, start: u16, end: u16, device: P) {
        self.maps.push(Mapping {
            range: start..=end,
            device: Box::new(device),
        });
    }

    /// Zero-fills RAM. Mappings stay registered.
    pub fn clear(&mut self) {
        self.mem.fill(0);
    }

    /// Copies `bytes` into RAM at `start` without notifying peripherals.
    pub fn load(&mut self, start: u16, bytes: &[u8]) -> Result<()> {
        let off = start as usize;
        let end = off + bytes.len();
        if end > self.mem.len() {
            return Err(anyhow!(
                "{} bytes at {:#06x} exceed {}-byte memory",
                bytes.len(),
                start,
                self.mem.len()
            ));
        }
        self.mem[off..end].copy_from_slice(bytes);
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mem
    }

    fn index(&self, addr: usize) -> Result<usize> {
        if addr < self.mem.len() {
            Ok(addr)
        } else {
            Err(anyhow!(
                "address {:#06x} outside {}-byte memory",
                addr,
                self.mem.len()
            ))
        }
    }
}

impl Bus for Memory {
    fn read_u8(&mut self, addr: u16) -> Result<u8> {
        let i = self.index(addr as usize)?;
        Ok(self.mem[i])
    }
    fn read_u16(&mut self, addr: u16) -> Result<u16> {
        let hi = self.index(addr as usize)?;
        let lo = self.index(addr as usize + 1)?;
        Ok(u16::from_be_bytes([self.mem[hi], self.mem[lo]]))
    }
    fn write_u8(&mut self, addr: u16, val: u8) -> Result<()> {
        let i = self.index(addr as usize)?;
        for m in self.maps.iter_mut().filter(|m| m.range.contains(&addr)) {
            m.device.poke(addr, val);
        }
        self.mem[i] = val;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_reads_are_big_endian() {
        let mut mem = Memory::new(8);
        mem.load(2, &[0x12, 0x34]).unwrap();
        assert_eq!(mem.read_u16(2).unwrap(), 0x1234);
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mut mem = Memory::new(4);
        assert!(mem.read_u8(4).is_err());
        assert!(mem.read_u16(3).is_err());
        assert!(mem.write_u8(9, 1).is_err());
        assert!(mem.load(3, &[1, 2]).is_err());
        assert_eq!(mem.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn full_address_space_reads_last_byte() {
        let mut mem = Memory::new(64 * 1024);
        mem.write_u8(0xFFFF, 0xAB).unwrap();
        assert_eq!(mem.read_u8(0xFFFF).unwrap(), 0xAB);
        assert!(mem.read_u16(0xFFFF).is_err());
    }
}
