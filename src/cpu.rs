use crate::bits::BitCursor;
use crate::decoder::{DecodeError, Decoded, Decoder};
use crate::disasm::fmt_instruction;
use crate::exec::Executor;
use crate::operands::{self, Operand};
use crate::registers::RegisterFile;
use serde::{Deserialize, Serialize};

/// What the run loop does when an instruction fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop the run at the first failure.
    #[default]
    Abort,
    /// Drop the failing byte and resume decoding at the next one.
    Skip,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub on_error: ErrorPolicy,
    pub execute: bool, // false: disassemble only
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::Abort,
            execute: true,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Trap {
    #[error("decode failed at offset {offset:#06x}: {source}")]
    Decode {
        offset: usize,
        #[source]
        source: DecodeError,
    },
}

/// A fully decoded and rendered instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    pub offset: usize,
    pub bytes: Vec<u8>,
    pub op: Decoded,
    pub operands: Vec<Operand>,
    pub text: String,
}

/// Outcome of running a whole stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub instructions: Vec<Instruction>,
    /// Failures passed over under [`ErrorPolicy::Skip`].
    pub skipped: Vec<Trap>,
    /// Failure that ended the run early under [`ErrorPolicy::Abort`].
    pub trap: Option<Trap>,
}

impl Run {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.instructions.iter().map(|i| i.text.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cpu {
    pub regs: RegisterFile,
    pub cfg: CpuConfig,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            regs: RegisterFile::new(),
            cfg,
        }
    }

    pub fn reset(&mut self) {
        self.regs = RegisterFile::new();
    }

    /// Decode, render and (if enabled) execute the next instruction.
    /// `Ok(None)` once the cursor sits at the end of the stream.
    pub fn step<D: Decoder, X: Executor>(
        &mut self,
        cursor: &mut BitCursor,
        dec: &D,
        exec: &X,
    ) -> Result<Option<Instruction>, Trap> {
        if cursor.is_exhausted() {
            return Ok(None);
        }
        let offset = cursor.byte_offset();
        let trap = |source: DecodeError| Trap::Decode { offset, source };

        let op = dec.decode(cursor).map_err(trap)?;
        let operands = operands::resolve(&op).map_err(trap)?;
        let text = fmt_instruction(op.mnemonic, &operands);
        let insn = Instruction {
            offset,
            bytes: cursor.bytes()[offset..offset + op.len].to_vec(),
            op,
            operands,
            text,
        };
        if self.cfg.execute {
            exec.exec(&mut self.regs, &insn);
        }
        Ok(Some(insn))
    }

    /// Step until the stream is exhausted, applying the configured
    /// [`ErrorPolicy`] to failures.
    pub fn run<D: Decoder, X: Executor>(
        &mut self,
        cursor: &mut BitCursor,
        dec: &D,
        exec: &X,
    ) -> Run {
        let mut run = Run::default();
        loop {
            let offset = cursor.byte_offset();
            match self.step(cursor, dec, exec) {
                Ok(Some(insn)) => run.instructions.push(insn),
                Ok(None) => break,
                Err(trap) => match self.cfg.on_error {
                    ErrorPolicy::Abort => {
                        run.trap = Some(trap);
                        break;
                    }
                    ErrorPolicy::Skip => {
                        tracing::warn!(%trap, "skipping byte");
                        run.skipped.push(trap);
                        cursor.seek_byte(offset + 1);
                    }
                },
            }
        }
        run
    }
}
