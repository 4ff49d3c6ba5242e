pub mod computer;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod hex;
pub mod image;
pub mod instructions;
pub mod memory;
pub mod screen;

pub mod isa {
    pub mod b32; // the only encoding the processor speaks
}

pub use computer::{Computer, ComputerConfig, Halt, HaltReason, LoadError, StopHandle};
pub use cpu::{Compare, Cpu, Reg, RegisterSnapshot, Step, Trap};
pub use image::{Image, ImageError, DEFAULT_ORIGIN};
pub use memory::{Bus, Memory, Peripheral};
pub use screen::{Screen, ScreenConfig};
