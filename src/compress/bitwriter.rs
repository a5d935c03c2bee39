use std::io::{self, Write};

/// LSB-first bit writer, the write half of the bit cursor.
pub(crate) struct BitWriter<W: Write> {
    buffer: u64,
    nbits: u8,
    writer: W,
}
impl<W: Write> BitWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            buffer: 0,
            nbits: 0,
            writer,
        }
    }

    /// Appends the low `nbits` bits of `bits`. Higher bits must be zero.
    pub fn write_bits(&mut self, bits: u64, nbits: u8) -> io::Result<()> {
        debug_assert!(nbits <= 64);
        debug_assert!(nbits == 64 || bits >> nbits == 0);

        self.buffer |= bits.checked_shl(self.nbits as u32).unwrap_or(0);
        self.nbits += nbits;

        if self.nbits >= 64 {
            self.writer.write_all(&self.buffer.to_le_bytes())?;
            self.nbits -= 64;
            self.buffer = bits.checked_shr((nbits - self.nbits) as u32).unwrap_or(0);
        }
        debug_assert!(self.nbits < 64);
        Ok(())
    }

    /// Pads to a byte boundary with zero bits and writes out everything buffered.
    pub fn flush(&mut self) -> io::Result<&mut W> {
        if self.nbits % 8 != 0 {
            self.write_bits(0, 8 - self.nbits % 8)?;
        }
        if self.nbits > 0 {
            self.writer
                .write_all(&self.buffer.to_le_bytes()[..self.nbits as usize / 8])?;
            self.buffer = 0;
            self.nbits = 0;
        }
        Ok(&mut self.writer)
    }

    pub fn take(self) -> W {
        debug_assert_eq!(self.nbits, 0);
        self.writer
    }
}
