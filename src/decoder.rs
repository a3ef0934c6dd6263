use serde::Serialize;

use crate::bits::BitCursor;
use crate::instructions::{self, Field, FieldKind, Mnemonic, Scheme};
use crate::isa::i8086::DIRECT_ADDRESS_RM;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode {byte:#04x} ({byte:08b})")]
    UnknownOpcode { byte: u8 },
    #[error("{mnemonic} encoding {byte:#04x} is not implemented")]
    Unimplemented { byte: u8, mnemonic: &'static str },
    #[error("stream ended at byte {offset} in the middle of an instruction")]
    TruncatedStream { offset: usize },
    #[error("invalid addressing state: {0}")]
    InvalidAddressingState(&'static str),
}

/// What an operand position was filled from while walking fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperandKind {
    Register,
    Memory,
    Immediate,
}

/// Raw field values of one instruction. Slots stay `None` when the scheme
/// has no such field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decoded {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub literal: Vec<Field>,
    pub d: Option<u8>,
    pub s: Option<u8>,
    pub w: Option<u8>,
    pub mode: Option<u8>,
    pub reg: Option<u8>,
    pub ext: Option<u8>,
    pub rm: Option<u8>,
    pub sr: Option<u8>,
    pub disp_lo: Option<u8>,
    pub disp_hi: Option<u8>,
    pub addr_lo: Option<u8>,
    pub addr_hi: Option<u8>,
    pub data_lo: Option<u8>,
    pub data_hi: Option<u8>,
    pub kinds: Vec<OperandKind>,
    /// Bytes consumed, opcode included.
    pub len: usize,
}

impl Decoded {
    fn new(opcode: u8, mnemonic: Mnemonic) -> Self {
        Self {
            opcode,
            mnemonic,
            literal: Vec::new(),
            d: None,
            s: None,
            w: None,
            mode: None,
            reg: None,
            ext: None,
            rm: None,
            sr: None,
            disp_lo: None,
            disp_hi: None,
            addr_lo: None,
            addr_hi: None,
            data_lo: None,
            data_hi: None,
            kinds: Vec::new(),
            len: 0,
        }
    }

    pub fn wide(&self) -> bool {
        self.w == Some(1)
    }
}

pub trait Decoder {
    /// Decode the instruction starting at the cursor. On error the cursor
    /// position is unspecified; callers reposition it themselves.
    fn decode(&self, cursor: &mut BitCursor) -> Result<Decoded, DecodeError>;
}

/// Decoder that interprets the declarative schemes in
/// [`instructions::lookup`] one field at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct FieldWalker;

impl FieldWalker {
    pub fn new() -> Self {
        Self
    }

    fn walk_field(
        &self,
        op: &mut Decoded,
        field: Field,
        cursor: &mut BitCursor,
    ) -> Result<(), DecodeError> {
        let value = match field.kind {
            _ if field.width == 0 => field.value,
            // conditional and multi-byte fields read their own bytes below
            FieldKind::DataHi | FieldKind::Addr => 0,
            _ => cursor.take_bits(field.width)? as u8,
        };
        tracing::trace!(kind = ?field.kind, width = field.width, value, "field");

        match field.kind {
            FieldKind::Literal => {
                if value != field.value {
                    return Err(DecodeError::UnknownOpcode { byte: op.opcode });
                }
                op.literal.push(field);
            }
            FieldKind::D => op.d = Some(value),
            FieldKind::S => op.s = Some(value),
            FieldKind::W => op.w = Some(value),
            FieldKind::Mod => op.mode = Some(value),
            FieldKind::Extension => {
                op.ext = Some(value);
                op.mnemonic = immediate_group(op.opcode, value)?;
            }
            FieldKind::Reg => op.reg = Some(value),
            FieldKind::Sr => op.sr = Some(value),
            FieldKind::Rm => {
                op.rm = Some(value);
                self.walk_rm(op, value, cursor)?;
            }
            FieldKind::Disp => op.disp_lo = Some(value),
            FieldKind::DataLo => op.data_lo = Some(value),
            FieldKind::DataHi => {
                // S=1 widens the single data byte instead of reading another
                if op.wide() && op.s != Some(1) {
                    op.data_hi = Some(cursor.take_byte()?);
                }
            }
            FieldKind::Addr => {
                op.addr_lo = Some(cursor.take_byte()?);
                op.addr_hi = Some(cursor.take_byte()?);
            }
        }
        Ok(())
    }

    /// Pull whatever MOD says follows the ModRM byte.
    fn walk_rm(&self, op: &mut Decoded, rm: u8, cursor: &mut BitCursor) -> Result<(), DecodeError> {
        let mode = op
            .mode
            .ok_or(DecodeError::InvalidAddressingState("RM walked before MOD"))?;
        match mode {
            0b00 if rm == DIRECT_ADDRESS_RM => {
                op.addr_lo = Some(cursor.take_byte()?);
                op.addr_hi = Some(cursor.take_byte()?);
            }
            0b01 => op.disp_lo = Some(cursor.take_byte()?),
            0b10 => {
                op.disp_lo = Some(cursor.take_byte()?);
                op.disp_hi = Some(cursor.take_byte()?);
            }
            _ => {}
        }
        Ok(())
    }
}

impl Decoder for FieldWalker {
    fn decode(&self, cursor: &mut BitCursor) -> Result<Decoded, DecodeError> {
        let start = cursor.byte_offset();
        let opcode = cursor
            .peek_byte()
            .ok_or(DecodeError::TruncatedStream { offset: start })?;
        let scheme: &Scheme =
            instructions::lookup(opcode).ok_or(DecodeError::UnknownOpcode { byte: opcode })?;
        if scheme.is_stub() {
            return Err(DecodeError::Unimplemented {
                byte: opcode,
                mnemonic: scheme.mnemonic.as_str(),
            });
        }

        let mut op = Decoded::new(opcode, scheme.mnemonic);
        for &field in scheme.fields {
            self.walk_field(&mut op, field, cursor)?;
        }
        op.kinds = operand_kinds(&op);
        op.len = cursor.byte_offset() - start;
        tracing::debug!(offset = start, opcode, mnemonic = %op.mnemonic, len = op.len, "decoded");
        Ok(op)
    }
}

/// Kind of each operand in printed order, destination first.
fn operand_kinds(op: &Decoded) -> Vec<OperandKind> {
    use OperandKind::*;
    if op.mnemonic.is_jump() {
        return vec![Immediate];
    }
    let reg = (op.reg.is_some() || op.sr.is_some()).then_some(Register);
    let rm = match (op.rm, op.mode) {
        (Some(_), Some(0b11)) => Some(Register),
        (Some(_), _) => Some(Memory),
        (None, _) => op.addr_lo.map(|_| Memory),
    };
    let imm = op.data_lo.map(|_| Immediate);
    match (reg, rm, imm) {
        (_, Some(dst), Some(imm)) | (Some(dst), None, Some(imm)) => vec![dst, imm],
        (Some(reg), Some(rm), None) if op.d == Some(1) => vec![reg, rm],
        (Some(reg), Some(rm), None) => vec![rm, reg],
        (reg, rm, imm) => reg.into_iter().chain(rm).chain(imm).collect(),
    }
}

fn immediate_group(opcode: u8, ext: u8) -> Result<Mnemonic, DecodeError> {
    match ext {
        0b000 => Ok(Mnemonic::Add),
        0b101 => Ok(Mnemonic::Sub),
        0b111 => Ok(Mnemonic::Cmp),
        other => Err(DecodeError::Unimplemented {
            byte: opcode,
            mnemonic: ["add", "or", "adc", "sbb", "and", "sub", "xor", "cmp"][other as usize & 0b111],
        }),
    }
}
