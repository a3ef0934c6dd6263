use crate::cpu::Instruction;
use crate::instructions::Mnemonic;
use crate::operands::Operand;

/// Header NASM needs to reassemble a listing as 16-bit code.
pub const LISTING_HEADER: &str = "bits 16";

pub fn fmt_instruction(mnemonic: Mnemonic, operands: &[Operand]) -> String {
    match operands {
        [] => mnemonic.to_string(),
        [only] => format!("{mnemonic} {only}"),
        [dst, Operand::Immediate(imm)] if dst.is_memory() => {
            format!("{mnemonic} {dst}, {} {}", imm.width, imm.value)
        }
        [dst, src, ..] => format!("{mnemonic} {dst}, {src}"),
    }
}

/// One line per instruction under [`LISTING_HEADER`], newline-terminated.
pub fn listing<'a>(instrs: impl IntoIterator<Item = &'a Instruction>) -> String {
    let mut out = format!("{LISTING_HEADER}\n");
    for insn in instrs {
        out.push_str(&insn.text);
        out.push('\n');
    }
    out
}
