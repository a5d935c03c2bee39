//! Canonical Huffman decode tables.
//!
//! A table is a flattened binary trie: an arena of [`TableEntry`] values addressed by index, with
//! the root at index 0. Every internal node owns a pair of adjacent slots, the first reached by a
//! 0 bit and the second by a 1 bit. The decoder walks it one input bit at a time.

use tracing::trace;

use crate::{
    decompress::BitCursor,
    profile::Profile,
    tables::{
        CLCL_ORDER, DIST_SYM_TO_DIST_BASE, DIST_SYM_TO_DIST_EXTRA, END_OF_BLOCK,
        LEN_SYM_TO_LEN_BASE, LEN_SYM_TO_LEN_EXTRA,
    },
    CodecError,
};

/// Default ceiling on the number of entries in a single decode table.
///
/// A complete code over the 288 literal/length symbols needs 575 entries.
pub const DEFAULT_MAX_TABLE_ENTRIES: usize = 1024;

const MAX_CODE_LENGTH: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEntry {
    /// Internal node whose children live at `next` (0 bit) and `next + 1` (1 bit).
    Internal { next: u16 },
    Literal(u8),
    Length { base: u16, extra: u8 },
    Distance { base: u16, extra: u8 },
    EndOfBlock,
    /// A symbol of the code length alphabet (0..=18).
    CodeLength(u8),
    /// A symbol that occupies codespace but can never appear in a valid stream.
    Reserved(u16),
    /// A branch with no code assigned.
    Vacant,
}

/// Alphabet a table decodes, which determines the leaf each symbol turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    LiteralLength,
    Distance,
    CodeLength,
}

impl TableKind {
    fn leaf(self, symbol: usize) -> TableEntry {
        match self {
            TableKind::LiteralLength => match symbol {
                0..=255 => TableEntry::Literal(symbol as u8),
                END_OF_BLOCK => TableEntry::EndOfBlock,
                257..=285 => TableEntry::Length {
                    base: LEN_SYM_TO_LEN_BASE[symbol - 257],
                    extra: LEN_SYM_TO_LEN_EXTRA[symbol - 257],
                },
                _ => TableEntry::Reserved(symbol as u16),
            },
            TableKind::Distance => match symbol {
                0..=29 => TableEntry::Distance {
                    base: DIST_SYM_TO_DIST_BASE[symbol],
                    extra: DIST_SYM_TO_DIST_EXTRA[symbol],
                },
                _ => TableEntry::Reserved(symbol as u16),
            },
            TableKind::CodeLength => TableEntry::CodeLength(symbol as u8),
        }
    }

    /// Whether a lone length-1 code (or no code at all) is tolerated.
    ///
    /// Encoders emit these for blocks with a single literal/length symbol or without
    /// back-references, so only the code length alphabet has to be complete.
    fn allows_incomplete(self) -> bool {
        self != TableKind::CodeLength
    }
}

/// A read-only decode trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeTable {
    entries: Vec<TableEntry>,
}

impl DecodeTable {
    /// Runs the canonical Huffman construction over `lengths`, indexed by symbol.
    pub fn build(
        lengths: &[u8],
        kind: TableKind,
        max_entries: usize,
    ) -> Result<Self, CodecError> {
        // Count the number of symbols with each code length.
        let mut histogram = [0usize; MAX_CODE_LENGTH + 1];
        for &length in lengths {
            if length as usize > MAX_CODE_LENGTH {
                return Err(CodecError::MalformedTable("code length exceeds 15 bits"));
            }
            histogram[length as usize] += 1;
        }

        // Determine the maximum code length.
        let mut max_length = MAX_CODE_LENGTH;
        while max_length > 0 && histogram[max_length] == 0 {
            max_length -= 1;
        }

        let mut table = DecodeTable {
            entries: vec![TableEntry::Vacant],
        };
        if max_length == 0 {
            if kind.allows_incomplete() {
                return Ok(table);
            }
            return Err(CodecError::MalformedTable("no codes assigned"));
        }

        // Sort symbols by code length. Given the histogram, we can determine the starting offset
        // for each code length.
        let mut offsets = [0; MAX_CODE_LENGTH + 1];
        let mut codespace_used = 0usize;
        offsets[1] = histogram[0];
        for i in 1..max_length {
            offsets[i + 1] = offsets[i] + histogram[i];
            codespace_used = (codespace_used << 1) + histogram[i];
        }
        codespace_used = (codespace_used << 1) + histogram[max_length];

        // Check that the provided lengths form a valid Huffman tree.
        let lone_code = max_length == 1 && histogram[1] == 1;
        if codespace_used > (1 << max_length) {
            return Err(CodecError::MalformedTable("code lengths are over-subscribed"));
        } else if codespace_used < (1 << max_length) && !(lone_code && kind.allows_incomplete()) {
            return Err(CodecError::MalformedTable("code lengths are incomplete"));
        }

        let mut sorted_symbols = vec![0; lengths.len()];
        for (symbol, &length) in lengths.iter().enumerate() {
            sorted_symbols[offsets[length as usize]] = symbol;
            offsets[length as usize] += 1;
        }

        // Assign canonical codes in order of increasing length and insert each into the trie.
        let mut code = 0u32;
        let mut i = histogram[0];
        for length in 1..=max_length {
            for _ in 0..histogram[length] {
                let symbol = sorted_symbols[i];
                i += 1;
                table.insert(code, length, kind.leaf(symbol), max_entries)?;
                code += 1;
            }
            code <<= 1;
        }

        Ok(table)
    }

    /// Inserts a code whose first transmitted bit is the most significant bit of `code`.
    fn insert(
        &mut self,
        code: u32,
        length: usize,
        leaf: TableEntry,
        max_entries: usize,
    ) -> Result<(), CodecError> {
        let mut node = 0;
        for shift in (0..length).rev() {
            let next = match self.entries[node] {
                TableEntry::Internal { next } => next as usize,
                TableEntry::Vacant => {
                    let next = self.entries.len();
                    if next + 2 > max_entries.min(u16::MAX as usize) {
                        return Err(CodecError::TableOverflow { limit: max_entries });
                    }
                    self.entries.push(TableEntry::Vacant);
                    self.entries.push(TableEntry::Vacant);
                    self.entries[node] = TableEntry::Internal { next: next as u16 };
                    next
                }
                _ => return Err(CodecError::MalformedTable("code is prefixed by another code")),
            };
            node = next + ((code >> shift) & 1) as usize;
        }

        if self.entries[node] != TableEntry::Vacant {
            return Err(CodecError::MalformedTable("code is assigned twice"));
        }
        self.entries[node] = leaf;
        Ok(())
    }

    /// Walks the trie from the root, consuming one bit per level, and returns the leaf reached.
    pub(crate) fn decode(&self, cursor: &mut BitCursor) -> Result<TableEntry, CodecError> {
        let mut entry = self.entries[0];
        while let TableEntry::Internal { next } = entry {
            let bit = cursor.consume_bit()?;
            entry = self.entries[next as usize + bit];
        }
        Ok(entry)
    }

    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries[0] == TableEntry::Vacant
    }
}

/// Builds the literal/length or distance table of a profile's fixed-table blocks.
pub fn build_fixed(profile: Profile, kind: TableKind) -> Result<DecodeTable, CodecError> {
    let fixed = profile.fixed_lengths();
    match kind {
        TableKind::LiteralLength => {
            DecodeTable::build(&fixed.litlen, kind, DEFAULT_MAX_TABLE_ENTRIES)
        }
        TableKind::Distance => DecodeTable::build(&fixed.dist, kind, DEFAULT_MAX_TABLE_ENTRIES),
        TableKind::CodeLength => Err(CodecError::MalformedTable(
            "fixed tables have no code length alphabet",
        )),
    }
}

/// Tables read from the header of a dynamic-table block.
#[derive(Debug)]
pub struct DynamicTables {
    pub litlen: DecodeTable,
    pub dist: DecodeTable,
    /// Number of bits the header occupied.
    pub header_bits: u64,
}

/// Reads a dynamic block header (everything after the 3-bit block header) and builds its tables.
pub(crate) fn build_dynamic(
    cursor: &mut BitCursor,
    max_entries: usize,
) -> Result<DynamicTables, CodecError> {
    let start = cursor.bit_position();

    // Read the huffman table sizes.
    let hlit = cursor.consume(5)? as usize + 257;
    let hdist = cursor.consume(5)? as usize + 1;
    let hclen = cursor.consume(4)? as usize + 4;
    trace!(hlit, hdist, hclen, "dynamic block header");
    if hlit > 286 {
        return Err(CodecError::MalformedTable("more than 286 literal/length codes"));
    }
    if hdist > 30 {
        return Err(CodecError::MalformedTable("more than 30 distance codes"));
    }

    // Read code length code lengths.
    let mut code_length_lengths = [0u8; 19];
    for &symbol in &CLCL_ORDER[..hclen] {
        code_length_lengths[symbol] = cursor.consume(3)? as u8;
    }
    let code_length_table =
        DecodeTable::build(&code_length_lengths, TableKind::CodeLength, max_entries)?;

    // Read literal/length and distance code lengths. Runs may cross from one alphabet into
    // the other.
    let total = hlit + hdist;
    let mut lengths = [0u8; 286 + 30];
    let mut i = 0;
    while i < total {
        let (value, repeat) = match code_length_table.decode(cursor)? {
            TableEntry::CodeLength(length @ 0..=15) => (length, 1),
            TableEntry::CodeLength(16) => {
                if i == 0 {
                    return Err(CodecError::MalformedTable("repeat with no previous length"));
                }
                (lengths[i - 1], 3 + cursor.consume(2)? as usize)
            }
            TableEntry::CodeLength(17) => (0, 3 + cursor.consume(3)? as usize),
            TableEntry::CodeLength(18) => (0, 11 + cursor.consume(7)? as usize),
            _ => return Err(CodecError::MalformedTable("invalid code length symbol")),
        };
        if i + repeat > total {
            return Err(CodecError::MalformedTable("code length run overflows header"));
        }
        lengths[i..i + repeat].fill(value);
        i += repeat;
    }

    if lengths[END_OF_BLOCK] == 0 {
        return Err(CodecError::MalformedTable("no end of block code"));
    }

    let litlen = DecodeTable::build(&lengths[..hlit], TableKind::LiteralLength, max_entries)?;
    let dist = DecodeTable::build(&lengths[hlit..total], TableKind::Distance, max_entries)?;

    Ok(DynamicTables {
        litlen,
        dist,
        header_bits: cursor.bit_position() - start,
    })
}

/// Computes bit-reversed canonical codes, ready to be written LSB-first.
pub(crate) const fn compute_codes<const NSYMS: usize>(lengths: &[u8; NSYMS]) -> [u16; NSYMS] {
    let mut codes = [0u16; NSYMS];

    let mut code = 0u32;

    let mut len = 1;
    while len <= 16 {
        let mut i = 0;
        while i < lengths.len() {
            if lengths[i] == len {
                codes[i] = (code as u16).reverse_bits() >> (16 - len);
                code += 1;
            }
            i += 1;
        }
        code <<= 1;
        len += 1;
    }

    codes
}
