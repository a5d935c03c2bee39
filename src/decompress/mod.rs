mod cursor;

pub(crate) use cursor::BitCursor;

use tracing::debug;

use crate::{
    huffman::{self, DecodeTable, TableEntry, TableKind},
    profile::Profile,
    CodecError, CompressionType,
};

/// Decodes a raw compressed stream block by block into a growing output buffer.
pub struct Decompressor<'a> {
    cursor: BitCursor<'a>,
    profile: Profile,
    output: Vec<u8>,
    /// Maximum number of bytes the stream may decode to.
    limit: usize,
    max_table_entries: usize,

    /// Fixed tables, built on the first fixed-table block and kept for the rest of the stream.
    fixed_tables: Option<(DecodeTable, DecodeTable)>,

    done: bool,
}

impl<'a> Decompressor<'a> {
    pub fn new(input: &'a [u8], profile: Profile, limit: usize) -> Self {
        Self {
            cursor: BitCursor::new(input),
            profile,
            output: Vec::new(),
            limit,
            max_table_entries: huffman::DEFAULT_MAX_TABLE_ENTRIES,
            fixed_tables: None,
            done: false,
        }
    }

    /// Caps the size of the decode tables built for dynamic blocks.
    pub fn with_max_table_entries(mut self, max_table_entries: usize) -> Self {
        self.max_table_entries = max_table_entries;
        self
    }

    /// Decodes the next block and returns its type.
    ///
    /// Fails with [`CodecError::StreamEnded`] once the final block has been decoded.
    pub fn read_block(&mut self) -> Result<CompressionType, CodecError> {
        if self.done {
            return Err(CodecError::StreamEnded);
        }

        let last = self.cursor.consume(1)? == 1;
        let block_type = self.cursor.consume(2)? as u8;
        let block_type = CompressionType::from_block_tag(block_type)?;

        match block_type {
            CompressionType::Stored => self.read_stored()?,
            CompressionType::Fixed => {
                let (litlen, dist) = match self.fixed_tables.take() {
                    Some(tables) => tables,
                    None => (
                        huffman::build_fixed(self.profile, TableKind::LiteralLength)?,
                        huffman::build_fixed(self.profile, TableKind::Distance)?,
                    ),
                };
                let result = self.read_compressed(&litlen, &dist);
                self.fixed_tables = Some((litlen, dist));
                result?
            }
            CompressionType::Dynamic => {
                let tables = huffman::build_dynamic(&mut self.cursor, self.max_table_entries)?;
                self.read_compressed(&tables.litlen, &tables.dist)?
            }
        }

        debug!(
            ?block_type,
            last,
            output_len = self.output.len(),
            "decoded block"
        );
        self.done = last;
        Ok(block_type)
    }

    fn read_stored(&mut self) -> Result<(), CodecError> {
        self.cursor.align_to_byte();
        let len = self.cursor.consume(16)? as u16;
        let nlen = self.cursor.consume(16)? as u16;
        if nlen != !len {
            return Err(CodecError::StoredLengthMismatch { len, nlen });
        }
        self.reserve(len as usize)?;
        self.cursor.read_aligned(len as usize, &mut self.output)
    }

    fn read_compressed(
        &mut self,
        litlen: &DecodeTable,
        dist: &DecodeTable,
    ) -> Result<(), CodecError> {
        loop {
            match litlen.decode(&mut self.cursor)? {
                TableEntry::Literal(byte) => {
                    self.reserve(1)?;
                    self.output.push(byte);
                }
                TableEntry::EndOfBlock => return Ok(()),
                TableEntry::Length { base, extra } => {
                    let length = base as usize + self.cursor.consume_extra(extra)? as usize;
                    let distance = match dist.decode(&mut self.cursor)? {
                        TableEntry::Distance { base, extra } => {
                            base as usize + self.cursor.consume_extra(extra)? as usize
                        }
                        _ => return Err(CodecError::InvalidSymbol),
                    };
                    self.reserve(length)?;
                    copy_match(&mut self.output, distance, length)?;
                }
                _ => return Err(CodecError::InvalidSymbol),
            }
        }
    }

    fn reserve(&self, additional: usize) -> Result<(), CodecError> {
        if self.output.len() + additional > self.limit {
            return Err(CodecError::OutputOverflow { limit: self.limit });
        }
        Ok(())
    }

    /// Decodes blocks until the final one and returns the output.
    pub fn finish(mut self) -> Result<Vec<u8>, CodecError> {
        while !self.done {
            self.read_block()?;
        }
        Ok(self.output)
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Number of input bits consumed so far.
    pub fn bit_position(&self) -> u64 {
        self.cursor.bit_position()
    }

    /// Number of input bytes consumed so far, counting a partially used final byte.
    pub fn bytes_consumed(&self) -> usize {
        self.cursor.bytes_consumed()
    }
}

/// Appends `length` bytes copied from `distance` bytes back.
///
/// Source and destination overlap whenever `distance < length`, in which case the copy reads
/// bytes it has just written, so it has to go one byte at a time.
pub(crate) fn copy_match(
    output: &mut Vec<u8>,
    distance: usize,
    length: usize,
) -> Result<(), CodecError> {
    if distance == 0 || distance > output.len() {
        return Err(CodecError::DistanceTooFar {
            distance,
            available: output.len(),
        });
    }

    output.reserve(length);
    let start = output.len() - distance;
    for i in start..start + length {
        let byte = output[i];
        output.push(byte);
    }
    Ok(())
}

/// Decompresses a raw stream, failing if it would decode to more than `limit` bytes.
pub fn decompress_to_vec(
    input: &[u8],
    profile: Profile,
    limit: usize,
) -> Result<Vec<u8>, CodecError> {
    Decompressor::new(input, profile, limit).finish()
}
