use crate::cpu::Instruction;
use crate::instructions::Mnemonic;
use crate::operands::Operand;
use crate::registers::RegisterFile;

pub trait Executor {
    fn exec(&self, regs: &mut RegisterFile, insn: &Instruction);
}

/// Applies immediate-to-register mov/add/sub. Everything else, including
/// cmp and memory destinations, leaves the registers untouched.
pub struct ImmExecutor;
impl Executor for ImmExecutor {
    fn exec(&self, regs: &mut RegisterFile, insn: &Instruction) {
        let [Operand::Register(dst), Operand::Immediate(imm)] = insn.operands.as_slice() else {
            return;
        };
        let (dst, imm) = (*dst, imm.value as u16);
        match insn.op.mnemonic {
            Mnemonic::Mov => regs.put(dst, imm),
            Mnemonic::Add => regs.put(dst, regs.get(dst).wrapping_add(imm)),
            Mnemonic::Sub => regs.put(dst, regs.get(dst).wrapping_sub(imm)),
            _ => {}
        }
    }
}
