pub mod bits;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod operands;
pub mod registers;

pub mod isa {
    pub mod i8086; // register encodings and effective-address bases
}

pub use bits::BitCursor;
pub use cpu::{Cpu, CpuConfig, ErrorPolicy, Instruction, Run, Trap};
pub use decoder::{DecodeError, Decoded, Decoder, FieldWalker};
pub use registers::{RegisterFile, RegisterId};
