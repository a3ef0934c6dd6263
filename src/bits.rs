use bitvec::prelude::*;

use crate::decoder::DecodeError;

/// Sequential MSB-first reader over an owned instruction stream.
///
/// Fields are pulled at arbitrary widths; a field only moves into the next
/// byte once the bits left in the current one are used up, so the cursor
/// never needs to be told where a byte ends.
#[derive(Debug, Clone)]
pub struct BitCursor {
    bits: BitVec<u8, Msb0>,
    pos: usize,
}

impl BitCursor {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bits: BitVec::from_vec(bytes.into()),
            pos: 0,
        }
    }

    /// Read the next `width` bits (1..=16) as an unsigned value.
    pub fn take_bits(&mut self, width: u8) -> Result<u16, DecodeError> {
        debug_assert!((1..=16).contains(&width), "bad field width {width}");
        let end = self.pos + width as usize;
        if end > self.bits.len() {
            return Err(DecodeError::TruncatedStream {
                offset: self.bits.len() / 8,
            });
        }
        let v = self.bits[self.pos..end].load_be::<u16>();
        self.pos = end;
        Ok(v)
    }

    pub fn take_byte(&mut self) -> Result<u8, DecodeError> {
        self.take_bits(8).map(|v| v as u8)
    }

    /// Byte under the cursor without consuming it.
    pub fn peek_byte(&self) -> Option<u8> {
        self.bits.as_raw_slice().get(self.pos / 8).copied()
    }

    /// Index of the byte holding the next unread bit.
    pub fn byte_offset(&self) -> usize {
        self.pos / 8
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.bits.len()
    }

    /// Drop any partial-byte state and continue from byte `offset`.
    pub fn seek_byte(&mut self, offset: usize) {
        self.pos = (offset * 8).min(self.bits.len());
    }

    pub fn bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_msb_first_within_a_byte() {
        // 100010 1 1 | 11 001 011
        let mut c = BitCursor::new(vec![0x8B, 0xCB]);
        assert_eq!(c.take_bits(6).unwrap(), 0b100010);
        assert_eq!(c.take_bits(1).unwrap(), 1);
        assert_eq!(c.take_bits(1).unwrap(), 1);
        assert_eq!(c.byte_offset(), 1);
        assert_eq!(c.take_bits(2).unwrap(), 0b11);
        assert_eq!(c.take_bits(3).unwrap(), 0b001);
        assert_eq!(c.take_bits(3).unwrap(), 0b011);
        assert!(c.is_exhausted());
    }

    #[test]
    fn wide_reads_span_bytes() {
        let mut c = BitCursor::new(vec![0xAB, 0xCD, 0xEF]);
        assert_eq!(c.take_bits(4).unwrap(), 0xA);
        assert_eq!(c.take_bits(16).unwrap(), 0xBCDE);
        assert_eq!(c.take_bits(4).unwrap(), 0xF);
    }

    #[test]
    fn short_read_reports_truncation_without_advancing() {
        let mut c = BitCursor::new(vec![0xB8, 0x01]);
        c.take_byte().unwrap();
        assert_eq!(c.take_bits(16), Err(DecodeError::TruncatedStream { offset: 2 }));
        assert_eq!(c.take_byte().unwrap(), 0x01);
        assert_eq!(c.peek_byte(), None);
    }

    #[test]
    fn seek_realigns_to_a_byte() {
        let mut c = BitCursor::new(vec![0xFF, 0x12]);
        c.take_bits(3).unwrap();
        c.seek_byte(1);
        assert_eq!(c.peek_byte(), Some(0x12));
        c.seek_byte(9);
        assert!(c.is_exhausted());
    }
}
