use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Literal,
    D,
    S,
    W,
    Rm,
    Mod,
    Reg,
    /// Opcode extension held in the REG slot of group encodings.
    Extension,
    Sr,
    Disp,
    DataLo,
    DataHi,
    Addr,
}

/// One bit field of an encoding. Width 0 means `value` is implied by the
/// opcode and nothing is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub kind: FieldKind,
    pub width: u8,
    pub value: u8,
}

impl Field {
    pub const fn new(kind: FieldKind, width: u8) -> Self {
        Self { kind, width, value: 0 }
    }

    pub const fn lit(value: u8, width: u8) -> Self {
        Self {
            kind: FieldKind::Literal,
            width,
            value,
        }
    }

    pub const fn implied(kind: FieldKind, value: u8) -> Self {
        Self { kind, width: 0, value }
    }
}

pub const D: Field = Field::new(FieldKind::D, 1);
pub const S: Field = Field::new(FieldKind::S, 1);
pub const W: Field = Field::new(FieldKind::W, 1);
pub const MOD: Field = Field::new(FieldKind::Mod, 2);
pub const REG: Field = Field::new(FieldKind::Reg, 3);
pub const EXT: Field = Field::new(FieldKind::Extension, 3);
pub const RM: Field = Field::new(FieldKind::Rm, 3);
pub const SR: Field = Field::new(FieldKind::Sr, 2);
pub const DISP8: Field = Field::new(FieldKind::Disp, 8);
pub const DATA: Field = Field::new(FieldKind::DataLo, 8);
pub const DATA_IF_W: Field = Field::new(FieldKind::DataHi, 8);
pub const ADDR: Field = Field::new(FieldKind::Addr, 16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mnemonic {
    Mov,
    Add,
    Sub,
    Cmp,
    /// add/sub/cmp with an immediate, chosen by the extension field.
    Immed,
    Jo,
    Jno,
    Jb,
    Jnb,
    Je,
    Jne,
    Jbe,
    Jnbe,
    Js,
    Jns,
    Jp,
    Jnp,
    Jl,
    Jnl,
    Jle,
    Jnle,
    Jcxz,
    Loop,
    Loopz,
    Loopnz,
    Jmp,
}

impl Mnemonic {
    pub fn as_str(self) -> &'static str {
        use Mnemonic::*;
        match self {
            Mov => "mov",
            Add => "add",
            Sub => "sub",
            Cmp => "cmp",
            Immed => "immed",
            Jo => "jo",
            Jno => "jno",
            Jb => "jb",
            Jnb => "jnb",
            Je => "je",
            Jne => "jne",
            Jbe => "jbe",
            Jnbe => "jnbe",
            Js => "js",
            Jns => "jns",
            Jp => "jp",
            Jnp => "jnp",
            Jl => "jl",
            Jnl => "jnl",
            Jle => "jle",
            Jnle => "jnle",
            Jcxz => "jcxz",
            Loop => "loop",
            Loopz => "loopz",
            Loopnz => "loopnz",
            Jmp => "jmp",
        }
    }

    /// Short conditional jumps: one signed byte operand, no effect.
    pub fn is_jump(self) -> bool {
        use Mnemonic::*;
        matches!(
            self,
            Jo | Jno | Jb | Jnb | Je | Jne | Jbe | Jnbe | Js | Jns | Jp | Jnp | Jl | Jnl | Jle
                | Jnle | Jcxz
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How to walk the bits of every instruction starting with a given byte.
/// A scheme with no fields is a known opcode family that is not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheme {
    pub mnemonic: Mnemonic,
    pub fields: &'static [Field],
}

impl Scheme {
    const fn stub(mnemonic: Mnemonic) -> Self {
        Self {
            mnemonic,
            fields: &[],
        }
    }

    pub fn is_stub(&self) -> bool {
        self.fields.is_empty()
    }
}

static MOV_RM_REG: Scheme = Scheme {
    mnemonic: Mnemonic::Mov,
    fields: &[Field::lit(0b100010, 6), D, W, MOD, REG, RM],
};
static MOV_IMM_RM: Scheme = Scheme {
    mnemonic: Mnemonic::Mov,
    fields: &[
        Field::lit(0b1100011, 7),
        W,
        MOD,
        Field::lit(0b000, 3),
        RM,
        DATA,
        DATA_IF_W,
        Field::implied(FieldKind::D, 0),
    ],
};
static MOV_IMM_REG: Scheme = Scheme {
    mnemonic: Mnemonic::Mov,
    fields: &[
        Field::lit(0b1011, 4),
        W,
        REG,
        DATA,
        DATA_IF_W,
        Field::implied(FieldKind::D, 1),
    ],
};
static MOV_MEM_ACC: Scheme = Scheme {
    mnemonic: Mnemonic::Mov,
    fields: &[
        Field::lit(0b1010000, 7),
        W,
        ADDR,
        Field::implied(FieldKind::D, 1),
        Field::implied(FieldKind::Reg, 0),
    ],
};
static MOV_ACC_MEM: Scheme = Scheme {
    mnemonic: Mnemonic::Mov,
    fields: &[
        Field::lit(0b1010001, 7),
        W,
        ADDR,
        Field::implied(FieldKind::D, 0),
        Field::implied(FieldKind::Reg, 0),
    ],
};
static MOV_RM_SEG: Scheme = Scheme {
    mnemonic: Mnemonic::Mov,
    fields: &[
        Field::lit(0b100011, 6),
        D,
        Field::lit(0, 1),
        MOD,
        Field::lit(0, 1),
        SR,
        RM,
        Field::implied(FieldKind::W, 1),
    ],
};
static IMMED_RM: Scheme = Scheme {
    mnemonic: Mnemonic::Immed,
    fields: &[Field::lit(0b100000, 6), S, W, MOD, EXT, RM, DATA, DATA_IF_W],
};

macro_rules! acc_immediate {
    ($($name:ident = $prefix:literal => $mn:ident),* $(,)?) => {
        $(
            static $name: Scheme = Scheme {
                mnemonic: Mnemonic::$mn,
                fields: &[
                    Field::lit($prefix, 7),
                    W,
                    DATA,
                    DATA_IF_W,
                    Field::implied(FieldKind::D, 1),
                    Field::implied(FieldKind::Reg, 0),
                ],
            };
        )*
    };
}

acc_immediate! {
    ADD_IMM_ACC = 0b0000010 => Add,
    SUB_IMM_ACC = 0b0010110 => Sub,
    CMP_IMM_ACC = 0b0011110 => Cmp,
}

macro_rules! short_jumps {
    ($($name:ident = $op:literal => $mn:ident),* $(,)?) => {
        $(
            static $name: Scheme = Scheme {
                mnemonic: Mnemonic::$mn,
                fields: &[Field::lit($op, 8), DISP8],
            };
        )*
    };
}

short_jumps! {
    JO = 0x70 => Jo,
    JNO = 0x71 => Jno,
    JB = 0x72 => Jb,
    JNB = 0x73 => Jnb,
    JE = 0x74 => Je,
    JNE = 0x75 => Jne,
    JBE = 0x76 => Jbe,
    JNBE = 0x77 => Jnbe,
    JS = 0x78 => Js,
    JNS = 0x79 => Jns,
    JP = 0x7A => Jp,
    JNP = 0x7B => Jnp,
    JL = 0x7C => Jl,
    JNL = 0x7D => Jnl,
    JLE = 0x7E => Jle,
    JNLE = 0x7F => Jnle,
    JCXZ = 0xE3 => Jcxz,
}

static ADD_RM_REG: Scheme = Scheme::stub(Mnemonic::Add);
static SUB_RM_REG: Scheme = Scheme::stub(Mnemonic::Sub);
static CMP_RM_REG: Scheme = Scheme::stub(Mnemonic::Cmp);
static LOOPNZ: Scheme = Scheme::stub(Mnemonic::Loopnz);
static LOOPZ: Scheme = Scheme::stub(Mnemonic::Loopz);
static LOOP: Scheme = Scheme::stub(Mnemonic::Loop);
static JMP: Scheme = Scheme::stub(Mnemonic::Jmp);

/// Scheme for an instruction whose first byte is `byte`.
pub fn lookup(byte: u8) -> Option<&'static Scheme> {
    let scheme = match byte {
        0x88..=0x8B => &MOV_RM_REG,
        0x8C | 0x8E => &MOV_RM_SEG,
        0xB0..=0xBF => &MOV_IMM_REG,
        0xC6 | 0xC7 => &MOV_IMM_RM,
        0xA0 | 0xA1 => &MOV_MEM_ACC,
        0xA2 | 0xA3 => &MOV_ACC_MEM,
        0x80..=0x83 => &IMMED_RM,
        0x04 | 0x05 => &ADD_IMM_ACC,
        0x2C | 0x2D => &SUB_IMM_ACC,
        0x3C | 0x3D => &CMP_IMM_ACC,
        0x00..=0x03 => &ADD_RM_REG,
        0x28..=0x2B => &SUB_RM_REG,
        0x38..=0x3B => &CMP_RM_REG,
        0x70 => &JO,
        0x71 => &JNO,
        0x72 => &JB,
        0x73 => &JNB,
        0x74 => &JE,
        0x75 => &JNE,
        0x76 => &JBE,
        0x77 => &JNBE,
        0x78 => &JS,
        0x79 => &JNS,
        0x7A => &JP,
        0x7B => &JNP,
        0x7C => &JL,
        0x7D => &JNL,
        0x7E => &JLE,
        0x7F => &JNLE,
        0xE0 => &LOOPNZ,
        0xE1 => &LOOPZ,
        0xE2 => &LOOP,
        0xE3 => &JCXZ,
        0xE9 | 0xEB => &JMP,
        _ => return None,
    };
    Some(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_widths_are_whole_bytes() {
        for byte in 0..=u8::MAX {
            let Some(scheme) = lookup(byte) else { continue };
            let bits: u32 = scheme.fields.iter().map(|f| f.width as u32).sum();
            assert_eq!(bits % 8, 0, "opcode {byte:#04x}");
        }
    }

    #[test]
    fn register_codes_share_one_scheme() {
        let first = lookup(0xB0).unwrap();
        for byte in 0xB1..=0xBF {
            assert!(std::ptr::eq(first, lookup(byte).unwrap()));
        }
        assert!(lookup(0x0F).is_none());
        assert!(lookup(0xE2).unwrap().is_stub());
    }
}
