use serde::Serialize;
use std::fmt;

use crate::decoder::{DecodeError, Decoded};
use crate::isa::i8086::{self, EaBase, SegmentReg};
use crate::registers::RegisterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImmWidth {
    Byte,
    Word,
}

impl fmt::Display for ImmWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImmWidth::Byte => "byte",
            ImmWidth::Word => "word",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Immediate {
    pub value: i16,
    pub width: ImmWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemRef {
    Based { base: EaBase, disp: i16 },
    Direct(u16),
}

impl fmt::Display for MemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            MemRef::Direct(addr) => write!(f, "[{addr}]"),
            MemRef::Based { base, disp: 0 } => write!(f, "[{base}]"),
            MemRef::Based { base, disp } if disp < 0 => {
                write!(f, "[{base} - {}]", (disp as i32).unsigned_abs())
            }
            MemRef::Based { base, disp } => write!(f, "[{base} + {disp}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operand {
    Register(RegisterId),
    Segment(SegmentReg),
    Memory(MemRef),
    Immediate(Immediate),
    /// Signed instruction-pointer increment of a short jump.
    Relative(i8),
}

impl Operand {
    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Memory(_))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{r}"),
            Operand::Segment(s) => write!(f, "{s}"),
            Operand::Memory(m) => write!(f, "{m}"),
            Operand::Immediate(i) => write!(f, "{}", i.value),
            Operand::Relative(inc) => write!(f, "{inc}"),
        }
    }
}

/// Turn decoded fields into operands in printed order (destination first).
pub fn resolve(d: &Decoded) -> Result<Vec<Operand>, DecodeError> {
    if d.mnemonic.is_jump() {
        let inc = d
            .disp_lo
            .ok_or(DecodeError::InvalidAddressingState("jump without increment"))?;
        return Ok(vec![Operand::Relative(inc as i8)]);
    }

    let reg = reg_operand(d)?;
    let rm = rm_operand(d)?;
    let imm = immediate(d);

    let operands = match (reg, rm, imm) {
        (_, Some(dst), Some(imm)) | (Some(dst), None, Some(imm)) => {
            vec![dst, Operand::Immediate(imm)]
        }
        (Some(reg), Some(rm), None) => match d.d {
            Some(1) => vec![reg, rm],
            Some(_) => vec![rm, reg],
            None => {
                return Err(DecodeError::InvalidAddressingState(
                    "register and r/m operands without a direction bit",
                ))
            }
        },
        _ => {
            return Err(DecodeError::InvalidAddressingState(
                "fields do not form a two-operand instruction",
            ))
        }
    };
    Ok(operands)
}

fn width(d: &Decoded) -> Result<bool, DecodeError> {
    d.w.map(|w| w == 1)
        .ok_or(DecodeError::InvalidAddressingState("register named before W"))
}

fn reg_operand(d: &Decoded) -> Result<Option<Operand>, DecodeError> {
    if let Some(sr) = d.sr {
        return Ok(Some(Operand::Segment(SegmentReg::from_bits(sr))));
    }
    match d.reg {
        Some(reg) => Ok(Some(Operand::Register(i8086::register(width(d)?, reg)))),
        None => Ok(None),
    }
}

fn rm_operand(d: &Decoded) -> Result<Option<Operand>, DecodeError> {
    // direct addresses come from the accumulator forms and MOD=00,RM=110
    if let (Some(lo), Some(hi)) = (d.addr_lo, d.addr_hi) {
        return Ok(Some(Operand::Memory(MemRef::Direct(u16::from_le_bytes([lo, hi])))));
    }
    let Some(rm) = d.rm else { return Ok(None) };
    let mode = d
        .mode
        .ok_or(DecodeError::InvalidAddressingState("RM resolved before MOD"))?;
    let base = i8086::ea_base(rm);
    let operand = match (mode, d.disp_lo, d.disp_hi) {
        (0b11, _, _) => Operand::Register(i8086::register(width(d)?, rm)),
        (0b00, _, _) => Operand::Memory(MemRef::Based { base, disp: 0 }),
        (0b01, Some(lo), _) => Operand::Memory(MemRef::Based {
            base,
            disp: lo as i8 as i16,
        }),
        (0b10, Some(lo), Some(hi)) => Operand::Memory(MemRef::Based {
            base,
            disp: i16::from_le_bytes([lo, hi]),
        }),
        _ => {
            return Err(DecodeError::InvalidAddressingState(
                "displacement missing for MOD",
            ))
        }
    };
    Ok(Some(operand))
}

fn immediate(d: &Decoded) -> Option<Immediate> {
    let lo = d.data_lo?;
    let value = match d.data_hi {
        Some(hi) => i16::from_le_bytes([lo, hi]),
        None => lo as i8 as i16,
    };
    let width = if d.wide() { ImmWidth::Word } else { ImmWidth::Byte };
    Some(Immediate { value, width })
}
