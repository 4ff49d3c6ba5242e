use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use b32_rs::disasm::fmt_decoded;
use b32_rs::decoder::Decoder;
use b32_rs::isa::b32::B32Decoder;
use b32_rs::{Computer, ComputerConfig, HaltReason, Step};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a B32 executable on the virtual computer")]
struct Opts {
    /// Hex-text image as produced by b32-asm
    #[arg(value_name = "IMAGE")]
    input: PathBuf,
    /// JSON file overriding memory size, run interval and display geometry
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Single-step N instructions instead of running freely
    #[arg(long, value_name = "N")]
    steps: Option<u64>,
    /// Request a stop after this many milliseconds of free running
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
    /// Override the pause between instructions
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u64>,
    /// Print registers after each instruction, plus a listing when single-stepping
    #[arg(long)]
    trace: bool,
    /// Print the final registers as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let mut cfg = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<ComputerConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => ComputerConfig::default(),
    };
    if let Some(ms) = opts.interval_ms {
        cfg.interval_ms = ms;
    }

    let text = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let mut computer = Computer::new(cfg);
    computer.init();
    computer
        .load(&text)
        .with_context(|| format!("loading {}", opts.input.display()))?;

    if opts.trace {
        computer.attach_registers(Box::new(|regs| eprintln!("    {regs}")));
    }

    let abnormal = match opts.steps {
        Some(n) => single_step(&mut computer, n, opts.trace),
        None => {
            if let Some(ms) = opts.timeout_ms {
                let stop = computer.stop_handle();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(ms));
                    stop.request();
                });
            }
            let halt = computer.run();
            report(&halt.reason, halt.ip);
            halt.is_abnormal()
        }
    };

    let regs = computer.cpu().snapshot();
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&regs)?);
    } else {
        println!("{regs}");
    }
    for line in computer.screen().lines() {
        if !line.trim().is_empty() {
            println!("{}", line.trim_end());
        }
    }

    if abnormal {
        bail!("execution halted abnormally after {} instructions", computer.executed());
    }
    Ok(())
}

fn single_step(computer: &mut Computer, n: u64, trace: bool) -> bool {
    for _ in 0..n {
        if trace {
            print_next(computer);
        }
        match computer.step() {
            Ok(Step::Executed) => {}
            Ok(Step::End) => {
                report(&HaltReason::End, computer.cpu().ip);
                return false;
            }
            Err(trap) => {
                eprintln!("TRAP: {trap}");
                return true;
            }
        }
    }
    false
}

fn print_next(computer: &mut Computer) {
    let ip = computer.cpu().ip;
    if let Ok(d) = B32Decoder::new().decode(computer.memory_mut(), ip) {
        eprintln!("{ip:04X}: {}", fmt_decoded(&d));
    }
}

fn report(reason: &HaltReason, ip: u16) {
    match reason {
        HaltReason::Fault(trap) => eprintln!("TRAP: {trap}"),
        other => eprintln!("halted ({other:?}) at IP ${ip:04X}"),
    }
}
