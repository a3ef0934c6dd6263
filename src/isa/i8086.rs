use serde::{Deserialize, Serialize};
use std::fmt;

use crate::registers::RegisterId;

/// REG/RM register encodings, indexed by `[w][index]`.
pub const REGISTERS: [[RegisterId; 8]; 2] = [
    [
        RegisterId::Al,
        RegisterId::Cl,
        RegisterId::Dl,
        RegisterId::Bl,
        RegisterId::Ah,
        RegisterId::Ch,
        RegisterId::Dh,
        RegisterId::Bh,
    ],
    [
        RegisterId::Ax,
        RegisterId::Cx,
        RegisterId::Dx,
        RegisterId::Bx,
        RegisterId::Sp,
        RegisterId::Bp,
        RegisterId::Si,
        RegisterId::Di,
    ],
];

/// Register named by a REG or MOD=11 RM field. Indices past 7 are a bug in
/// the caller and panic.
pub fn register(w: bool, index: u8) -> RegisterId {
    REGISTERS[w as usize][index as usize]
}

/// RM value that means "direct address" when MOD=00.
pub const DIRECT_ADDRESS_RM: u8 = 0b110;

/// Base of a memory operand for MOD=00/01/10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EaBase {
    BxSi,
    BxDi,
    BpSi,
    BpDi,
    Si,
    Di,
    Bp,
    Bx,
}

pub const EA_BASES: [EaBase; 8] = [
    EaBase::BxSi,
    EaBase::BxDi,
    EaBase::BpSi,
    EaBase::BpDi,
    EaBase::Si,
    EaBase::Di,
    EaBase::Bp,
    EaBase::Bx,
];

pub fn ea_base(rm: u8) -> EaBase {
    EA_BASES[rm as usize]
}

impl EaBase {
    pub fn as_str(self) -> &'static str {
        match self {
            EaBase::BxSi => "bx + si",
            EaBase::BxDi => "bx + di",
            EaBase::BpSi => "bp + si",
            EaBase::BpDi => "bp + di",
            EaBase::Si => "si",
            EaBase::Di => "di",
            EaBase::Bp => "bp",
            EaBase::Bx => "bx",
        }
    }
}

impl fmt::Display for EaBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentReg {
    Es,
    Cs,
    Ss,
    Ds,
}

impl SegmentReg {
    pub fn from_bits(sr: u8) -> Self {
        match sr & 0b11 {
            0b00 => SegmentReg::Es,
            0b01 => SegmentReg::Cs,
            0b10 => SegmentReg::Ss,
            _ => SegmentReg::Ds,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentReg::Es => "es",
            SegmentReg::Cs => "cs",
            SegmentReg::Ss => "ss",
            SegmentReg::Ds => "ds",
        }
    }
}

impl fmt::Display for SegmentReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
