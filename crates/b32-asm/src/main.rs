use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use b32_asm::Assembler;
use b32_rs::DEFAULT_ORIGIN;

#[derive(Parser, Debug)]
#[command(author, version, about = "Two-pass B32 assembler")]
struct Opts {
    /// Input assembly file (labels at column 0, instructions indented)
    #[arg(short, long)]
    input: PathBuf,
    /// Output image file (hex text); printed to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Load and entry address written into the image header
    #[arg(long, default_value_t = DEFAULT_ORIGIN)]
    origin: u16,
    /// Export labels to JSON (Vec<{ name, offset, addr }>)
    #[arg(long, value_name = "FILE")]
    labels_out: Option<PathBuf>,
    /// Treat any diagnostic as fatal and write nothing
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let asm = Assembler::new(opts.origin).assemble(&text)?;

    for d in &asm.diagnostics {
        eprintln!("{}: {d}", opts.input.display());
    }
    if opts.strict && !asm.is_clean() {
        bail!("{} diagnostic(s), nothing written", asm.diagnostics.len());
    }

    let image = asm.image.to_string();
    match &opts.output {
        Some(path) => fs::write(path, &image).with_context(|| format!("writing {}", path.display()))?,
        None => println!("{image}"),
    }
    if let Some(path) = &opts.labels_out {
        let json = serde_json::to_string_pretty(&asm.label_table())?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}
