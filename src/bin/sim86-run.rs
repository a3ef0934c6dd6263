use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sim86_rs::disasm::listing;
use sim86_rs::exec::ImmExecutor;
use sim86_rs::{BitCursor, Cpu, CpuConfig, ErrorPolicy, FieldWalker};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Decode an 8086 binary and simulate its register effects"
)]
struct Opts {
    /// JSON file with a CpuConfig
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
    /// Skip undecodable bytes instead of stopping
    #[arg(long)]
    skip_errors: bool,
    /// Disassemble only; leave registers untouched
    #[arg(long)]
    no_exec: bool,
    /// Write the listing to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<String>,
    /// Register dump format
    #[arg(long, value_enum, default_value_t = DumpFormat::Text)]
    format: DumpFormat,
    #[arg(value_name = "BINFILE")]
    input: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DumpFormat { Text, Json }

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let mut cfg: CpuConfig = match &opts.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => CpuConfig::default(),
    };
    if opts.skip_errors { cfg.on_error = ErrorPolicy::Skip; }
    if opts.no_exec { cfg.execute = false; }

    let bytes = std::fs::read(&opts.input)?;
    let mut cursor = BitCursor::new(bytes);
    let mut cpu = Cpu::new(cfg);
    let run = cpu.run(&mut cursor, &FieldWalker::new(), &ImmExecutor);

    let text = listing(&run.instructions);
    match &opts.out {
        Some(path) => std::fs::write(path, &text)?,
        None => print!("{text}"),
    }
    for trap in &run.skipped {
        eprintln!("SKIPPED: {trap}");
    }
    if let Some(trap) = &run.trap {
        eprintln!("TRAP: {trap}");
    }

    println!();
    match opts.format {
        DumpFormat::Text => print!("{}", cpu.regs),
        DumpFormat::Json => println!("{}", serde_json::to_string_pretty(&cpu.regs.dump())?),
    }
    Ok(())
}
