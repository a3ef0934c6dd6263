use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::fmt::Write as _;
use std::path::Path;

use sim86_disasm::load_raw_bin;
use sim86_rs::disasm::listing;
use sim86_rs::exec::ImmExecutor;
use sim86_rs::{BitCursor, Cpu, CpuConfig, ErrorPolicy, FieldWalker, Instruction};

#[derive(Parser, Debug)]
#[command(author, version, about = "8086 disassembler CLI", long_about = None)]
struct Cli {
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Skip N bytes at start of file before decoding
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Limit bytes decoded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Prefix each line with its file offset and bytes (text format only)
    #[arg(long)]
    show_bytes: bool,
    /// Resynchronize on the next byte after a decode failure
    #[arg(long)]
    skip_errors: bool,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Debug, Clone, serde::Serialize)]
struct LineOut { offset: usize, bytes: String, mnemonic: String, text: String }

#[derive(Debug, Clone, serde::Serialize)]
struct Report { instructions: Vec<LineOut>, skipped: Vec<String>, error: Option<String> }

fn hex_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect::<Vec<_>>().join(" ")
}

fn line_out(origin: usize, insn: &Instruction) -> LineOut {
    LineOut {
        offset: origin + insn.offset,
        bytes: hex_bytes(&insn.bytes),
        mnemonic: insn.op.mnemonic.to_string(),
        text: insn.text.clone(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let img = load_raw_bin(Path::new(&cli.input), cli.skip, cli.len)?;

    let cfg = CpuConfig {
        on_error: if cli.skip_errors { ErrorPolicy::Skip } else { ErrorPolicy::Abort },
        execute: false,
    };
    let mut cpu = Cpu::new(cfg);
    let mut cursor = BitCursor::new(img.bytes);
    let run = cpu.run(&mut cursor, &FieldWalker::new(), &ImmExecutor);

    let buf = match cli.format {
        OutputFormat::Text if cli.show_bytes => {
            let mut buf = String::new();
            for insn in &run.instructions {
                let _ = writeln!(buf, "{:#06x}: {:<20} {}", img.origin + insn.offset, hex_bytes(&insn.bytes), insn.text);
            }
            buf
        }
        OutputFormat::Text => listing(&run.instructions),
        OutputFormat::Json => {
            let report = Report {
                instructions: run.instructions.iter().map(|i| line_out(img.origin, i)).collect(),
                skipped: run.skipped.iter().map(|t| t.to_string()).collect(),
                error: run.trap.as_ref().map(|t| t.to_string()),
            };
            serde_json::to_string_pretty(&report)? + "\n"
        }
    };
    if let Some(path) = cli.out { std::fs::write(path, buf)?; } else { print!("{}", buf); }

    if !matches!(cli.format, OutputFormat::Json) {
        for trap in &run.skipped { eprintln!("SKIPPED: {trap}"); }
        if let Some(trap) = &run.trap { eprintln!("TRAP: {trap}"); }
    }
    Ok(())
}
