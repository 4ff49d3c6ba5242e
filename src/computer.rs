//! The assembled machine: processor, 64 KiB memory and the mapped display,
//! plus the host-facing entry points (`init`, `load`, `step`, `tick`, `run`).

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cpu::{Cpu, RegisterSnapshot, Step, Trap};
use crate::exec::IntExecutor;
use crate::image::{Image, ImageError};
use crate::isa::b32::B32Decoder;
use crate::memory::Memory;
use crate::screen::{RenderCallback, Screen, ScreenConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputerConfig {
    pub memory_size: usize,
    /// Pause between instructions in `run`.
    pub interval_ms: u64,
    pub screen: ScreenConfig,
}

impl Default for ComputerConfig {
    fn default() -> Self {
        Self {
            memory_size: 64 * 1024,
            interval_ms: 1,
            screen: ScreenConfig::default(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error("image spans {start:#06x}..{end:#06x}, memory is {size} bytes")]
    TooLarge { start: u16, end: usize, size: usize },
}

/// Shared stop request. Cloning hands out another handle to the same flag,
/// which may be set from any thread.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub enum HaltReason {
    End,
    Stopped,
    Fault(Trap),
}

/// Where and why execution stopped.
#[derive(Debug)]
pub struct Halt {
    pub ip: u16,
    pub reason: HaltReason,
}

impl Halt {
    /// True when the program did not end through END or a stop request.
    pub fn is_abnormal(&self) -> bool {
        matches!(self.reason, HaltReason::Fault(_))
    }
}

pub type RegisterCallback = Box<dyn FnMut(&RegisterSnapshot)>;

pub struct Computer {
    cfg: ComputerConfig,
    cpu: Cpu,
    mem: Memory,
    screen: Rc<RefCell<Screen>>,
    dec: B32Decoder,
    exec: IntExecutor,
    on_registers: Option<RegisterCallback>,
    stop: StopHandle,
    executed: u64,
}

impl Computer {
    pub fn new(cfg: ComputerConfig) -> Self {
        let screen = Rc::new(RefCell::new(Screen::new(cfg.screen)));
        let mut mem = Memory::new(cfg.memory_size);
        let (start, end) = screen.borrow().span();
        mem.map(start, end, screen.clone());
        Self {
            cfg,
            cpu: Cpu::new(),
            mem,
            screen,
            dec: B32Decoder::new(),
            exec: IntExecutor,
            on_registers: None,
            stop: StopHandle::default(),
            executed: 0,
        }
    }

    pub fn config(&self) -> &ComputerConfig {
        &self.cfg
    }

    /// Zeroes memory, registers and flags and blanks the display.
    pub fn init(&mut self) {
        self.mem.clear();
        self.cpu = Cpu::new();
        self.screen.borrow_mut().init();
        self.executed = 0;
        debug!("computer initialised");
    }

    /// Parses a hex-text image and loads it. Nothing is modified on failure.
    pub fn load(&mut self, text: &str) -> Result<(), LoadError> {
        let image = text.parse::<Image>().map_err(|e| {
            warn!(error = %e, "rejected image");
            e
        })?;
        self.load_image(&image)
    }

    pub fn load_image(&mut self, image: &Image) -> Result<(), LoadError> {
        if let Err(e) = self.mem.load(image.start, &image.code) {
            warn!(error = %e, "image does not fit");
            return Err(LoadError::TooLarge {
                start: image.start,
                end: image.end(),
                size: self.mem.size(),
            });
        }
        self.cpu.reset(image.start, image.entry);
        self.executed = 0;
        debug!(
            start = image.start,
            entry = image.entry,
            len = image.code.len(),
            "image loaded"
        );
        Ok(())
    }

    pub fn attach_registers(&mut self, callback: RegisterCallback) {
        self.on_registers = Some(callback);
    }

    pub fn attach_screen(&mut self, callback: RenderCallback) {
        self.screen.borrow_mut().attach(callback);
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    pub fn screen(&self) -> Ref<'_, Screen> {
        self.screen.borrow()
    }

    /// Instructions executed since the last `init` or `load`, END included.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Executes exactly one instruction and notifies the register observer
    /// unless it was END.
    pub fn step(&mut self) -> Result<Step, Trap> {
        let step = self
            .cpu
            .step(&mut self.mem, &self.dec, &self.exec)
            .map_err(|trap| {
                warn!(%trap, "execution halted");
                trap
            })?;
        self.executed += 1;
        if step == Step::Executed {
            if let Some(cb) = self.on_registers.as_mut() {
                cb(&self.cpu.snapshot());
            }
        }
        Ok(step)
    }

    /// One scheduler slot: honours a pending stop request, otherwise steps.
    /// Returns `Some` once execution is over.
    pub fn tick(&mut self) -> Option<Halt> {
        if self.stop.take() {
            return Some(self.halt(HaltReason::Stopped));
        }
        match self.step() {
            Ok(Step::Executed) => None,
            Ok(Step::End) => Some(self.halt(HaltReason::End)),
            Err(trap) => Some(self.halt(HaltReason::Fault(trap))),
        }
    }

    /// Runs until END, a fault or a stop request, pausing `interval_ms`
    /// between instructions.
    pub fn run(&mut self) -> Halt {
        let pause = Duration::from_millis(self.cfg.interval_ms);
        loop {
            if let Some(halt) = self.tick() {
                return halt;
            }
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }
    }

    fn halt(&self, reason: HaltReason) -> Halt {
        // Drop a request that raced the final instruction.
        self.stop.take();
        let ip = self.cpu.ip;
        info!("stopped at IP {:#06x}: {:?}", ip, reason);
        Halt { ip, reason }
    }
}

impl Default for Computer {
    fn default() -> Self {
        Self::new(ComputerConfig::default())
    }
}
