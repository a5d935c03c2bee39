use crate::CodecError;

/// LSB-first bit reader over a borrowed byte slice.
///
/// Bytes are pulled into `buffer` one at a time and only when a read needs them, so the cache
/// never holds more than 39 bits and `bit_position` is always exact.
pub(crate) struct BitCursor<'a> {
    data: &'a [u8],
    offset: usize,
    buffer: u64,
    nbits: u8,
}

impl<'a> BitCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            buffer: 0,
            nbits: 0,
        }
    }

    fn fill_buffer(&mut self, nbits: u8) -> Result<(), CodecError> {
        while self.nbits < nbits {
            match self.data.get(self.offset) {
                Some(&byte) => {
                    self.buffer |= u64::from(byte) << self.nbits;
                    self.nbits += 8;
                    self.offset += 1;
                }
                None => {
                    return Err(CodecError::BufferUnderrun {
                        needed: u32::from(nbits - self.nbits),
                        position: self.bit_position(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Returns the next `nbits` bits without consuming them.
    pub fn peek(&mut self, nbits: u8) -> Result<u32, CodecError> {
        debug_assert!((1..=32).contains(&nbits));
        self.fill_buffer(nbits)?;
        Ok((self.buffer & ((1u64 << nbits) - 1)) as u32)
    }

    pub fn consume(&mut self, nbits: u8) -> Result<u32, CodecError> {
        let bits = self.peek(nbits)?;
        self.buffer >>= nbits;
        self.nbits -= nbits;
        Ok(bits)
    }

    pub fn consume_bit(&mut self) -> Result<usize, CodecError> {
        Ok(self.consume(1)? as usize)
    }

    /// Reads `nbits` extra bits; zero-width reads are allowed and return zero.
    pub fn consume_extra(&mut self, nbits: u8) -> Result<u32, CodecError> {
        if nbits == 0 {
            Ok(0)
        } else {
            self.consume(nbits)
        }
    }

    /// Skips to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let partial = self.nbits % 8;
        self.buffer >>= partial;
        self.nbits -= partial;
    }

    /// Appends `len` bytes to `out` verbatim. The cursor must be byte aligned.
    pub fn read_aligned(&mut self, mut len: usize, out: &mut Vec<u8>) -> Result<(), CodecError> {
        debug_assert_eq!(self.nbits % 8, 0);

        while len > 0 && self.nbits > 0 {
            out.push(self.buffer as u8);
            self.buffer >>= 8;
            self.nbits -= 8;
            len -= 1;
        }

        let available = self.data.len() - self.offset;
        if len > available {
            return Err(CodecError::BufferUnderrun {
                needed: ((len - available) * 8).min(u32::MAX as usize) as u32,
                position: self.bit_position(),
            });
        }
        out.extend_from_slice(&self.data[self.offset..][..len]);
        self.offset += len;
        Ok(())
    }

    /// Number of bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.offset as u64 * 8 - u64::from(self.nbits)
    }

    /// Number of input bytes touched by the bits consumed so far.
    pub fn bytes_consumed(&self) -> usize {
        ((self.bit_position() + 7) / 8) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsb_first() {
        let data = [0b1010_0010, 0b1100_0000];
        let mut cursor = BitCursor::new(&data);

        assert_eq!(cursor.consume(1).unwrap(), 0);
        assert_eq!(cursor.consume(1).unwrap(), 1);
        assert_eq!(cursor.consume(3).unwrap(), 0b000);
        assert_eq!(cursor.consume(3).unwrap(), 0b101);
        assert_eq!(cursor.peek(8).unwrap(), 0b1100_0000);
        assert_eq!(cursor.bit_position(), 8);
        assert_eq!(cursor.consume(8).unwrap(), 0b1100_0000);
        assert_eq!(cursor.bit_position(), 16);
    }

    #[test]
    fn straddles_bytes() {
        let data = [0xff, 0x01, 0x80, 0x7f, 0x12];
        let mut cursor = BitCursor::new(&data);

        assert_eq!(cursor.consume(4).unwrap(), 0xf);
        assert_eq!(cursor.consume(32).unwrap(), 0x27f8_001f);
        assert_eq!(cursor.bit_position(), 36);
        assert_eq!(cursor.consume(4).unwrap(), 0x1);
    }

    #[test]
    fn underrun() {
        let data = [0xab];
        let mut cursor = BitCursor::new(&data);
        assert_eq!(cursor.consume(6).unwrap(), 0x2b);
        assert!(matches!(
            cursor.peek(3),
            Err(CodecError::BufferUnderrun {
                needed: 1,
                position: 6
            })
        ));
        assert_eq!(cursor.consume(2).unwrap(), 0b10);
        assert!(cursor.consume(1).is_err());
    }

    #[test]
    fn aligned_copy() {
        let data = [0b0000_0101, 1, 2, 3, 4];
        let mut cursor = BitCursor::new(&data);
        assert_eq!(cursor.consume(3).unwrap(), 0b101);
        cursor.align_to_byte();
        assert_eq!(cursor.bit_position(), 8);

        assert_eq!(cursor.peek(16).unwrap(), 0x0201);
        let mut out = Vec::new();
        cursor.read_aligned(3, &mut out).unwrap();
        assert_eq!(out, [1, 2, 3]);
        assert_eq!(cursor.bytes_consumed(), 4);
        assert!(cursor.read_aligned(2, &mut out).is_err());
    }
}
