use serde::{Deserialize, Serialize};
use std::fmt;

/// Which bytes of a 2-byte storage a register name covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Full,
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterId {
    Al,
    Cl,
    Dl,
    Bl,
    Ah,
    Ch,
    Dh,
    Bh,
    Ax,
    Cx,
    Dx,
    Bx,
    Sp,
    Bp,
    Si,
    Di,
}

impl RegisterId {
    /// Every view in dump order.
    pub const ALL: [RegisterId; 16] = [
        RegisterId::Al,
        RegisterId::Cl,
        RegisterId::Dl,
        RegisterId::Bl,
        RegisterId::Ah,
        RegisterId::Ch,
        RegisterId::Dh,
        RegisterId::Bh,
        RegisterId::Ax,
        RegisterId::Cx,
        RegisterId::Dx,
        RegisterId::Bx,
        RegisterId::Sp,
        RegisterId::Bp,
        RegisterId::Si,
        RegisterId::Di,
    ];

    /// Storage slot and the part of it this name refers to.
    pub fn slot(self) -> (usize, View) {
        use RegisterId::*;
        match self {
            Al => (0, View::Low),
            Cl => (1, View::Low),
            Dl => (2, View::Low),
            Bl => (3, View::Low),
            Ah => (0, View::High),
            Ch => (1, View::High),
            Dh => (2, View::High),
            Bh => (3, View::High),
            Ax => (0, View::Full),
            Cx => (1, View::Full),
            Dx => (2, View::Full),
            Bx => (3, View::Full),
            Sp => (4, View::Full),
            Bp => (5, View::Full),
            Si => (6, View::Full),
            Di => (7, View::Full),
        }
    }

    pub fn view(self) -> View {
        self.slot().1
    }

    pub fn name(self) -> &'static str {
        use RegisterId::*;
        match self {
            Al => "al",
            Cl => "cl",
            Dl => "dl",
            Bl => "bl",
            Ah => "ah",
            Ch => "ch",
            Dh => "dh",
            Bh => "bh",
            Ax => "ax",
            Cx => "cx",
            Dx => "dx",
            Bx => "bx",
            Sp => "sp",
            Bp => "bp",
            Si => "si",
            Di => "di",
        }
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// General registers as eight 2-byte storages (ax cx dx bx sp bp si di).
/// Byte names address one byte of the first four; a write through a byte
/// view leaves the sibling byte alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    slots: [[u8; 2]; 8],
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reg: RegisterId) -> u16 {
        let (slot, view) = reg.slot();
        let [lo, hi] = self.slots[slot];
        match view {
            View::Low => lo as u16,
            View::High => hi as u16,
            View::Full => u16::from_le_bytes([lo, hi]),
        }
    }

    /// Store `val`; byte views keep only its low 8 bits.
    pub fn put(&mut self, reg: RegisterId, val: u16) {
        let (slot, view) = reg.slot();
        let storage = &mut self.slots[slot];
        match view {
            View::Low => storage[0] = val as u8,
            View::High => storage[1] = val as u8,
            View::Full => *storage = val.to_le_bytes(),
        }
        tracing::trace!(reg = reg.name(), val, "register write");
    }

    /// All sixteen views with their current values, in dump order.
    pub fn dump(&self) -> Vec<RegisterValue> {
        RegisterId::ALL
            .iter()
            .map(|&reg| RegisterValue {
                reg,
                value: self.get(reg),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegisterValue {
    #[serde(rename = "name")]
    pub reg: RegisterId,
    pub value: u16,
}

impl fmt::Display for RegisterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:b}", self.reg, self.value)?;
        match self.reg.view() {
            View::Low => f.write_str(" (lo)"),
            View::High => f.write_str(" (hi)"),
            View::Full => Ok(()),
        }
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.dump() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}
