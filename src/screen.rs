//! Memory-mapped text display.
//!
//! The display owns `width * height` cells of two bytes each: a character
//! code followed by an attribute byte. Any write into its range re-renders
//! the character plane and hands the lines to the attached callback.

use serde::{Deserialize, Serialize};

use crate::memory::Peripheral;

const BLANK: u8 = b' ';
const DEFAULT_ATTR: u8 = 0x07;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: usize,
    pub height: usize,
    pub base: u16,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 25,
            base: 0xA000,
        }
    }
}

/// Colour byte of a cell: low nibble foreground, high nibble background.
/// Each nibble is RGB plus a bright bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute(pub u8);

impl Attribute {
    pub fn foreground(self) -> u8 {
        self.0 & 0x0F
    }
    pub fn background(self) -> u8 {
        self.0 >> 4
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attr: Attribute,
}

pub type RenderCallback = Box<dyn FnMut(&[String])>;

pub struct Screen {
    cfg: ScreenConfig,
    buf: Vec<u8>,
    on_refresh: Option<RenderCallback>,
}

impl Screen {
    pub fn new(cfg: ScreenConfig) -> Self {
        let mut s = Self {
            cfg,
            buf: vec![0; cfg.width * cfg.height * 2],
            on_refresh: None,
        };
        s.init();
        s
    }

    pub fn config(&self) -> ScreenConfig {
        self.cfg
    }

    /// Fills every cell with a blank on the default attribute.
    pub fn init(&mut self) {
        for cell in self.buf.chunks_exact_mut(2) {
            cell[0] = BLANK;
            cell[1] = DEFAULT_ATTR;
        }
    }

    pub fn attach(&mut self, callback: RenderCallback) {
        self.on_refresh = Some(callback);
    }

    /// Inclusive address range covered by the cell buffer.
    pub fn span(&self) -> (u16, u16) {
        let base = self.cfg.base;
        let last = base as usize + self.buf.len().saturating_sub(1);
        (base, last.min(u16::MAX as usize) as u16)
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        if col >= self.cfg.width || row >= self.cfg.height {
            return None;
        }
        let off = (row * self.cfg.width + col) * 2;
        Some(Cell {
            ch: self.buf[off] as char,
            attr: Attribute(self.buf[off + 1]),
        })
    }

    /// Character plane split into `width`-long lines.
    pub fn lines(&self) -> Vec<String> {
        let chars: Vec<char> = self.buf.iter().step_by(2).map(|&b| b as char).collect();
        chars
            .chunks(self.cfg.width.max(1))
            .map(|line| line.iter().collect())
            .collect()
    }

    pub fn refresh(&mut self) {
        if self.on_refresh.is_none() {
            return;
        }
        let lines = self.lines();
        if let Some(cb) = self.on_refresh.as_mut() {
            cb(&lines);
        }
    }
}

impl Peripheral for Screen {
    fn poke(&mut self, addr: u16, value: u8) {
        let slot = (addr as usize)
            .checked_sub(self.cfg.base as usize)
            .and_then(|off| self.buf.get_mut(off));
        if let Some(b) = slot {
            *b = value;
        }
        self.refresh();
    }
}
