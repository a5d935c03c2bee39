//! Codec for the compressed asset format of Rare's Nintendo 64 titles.
//!
//! GoldenEye 007, Perfect Dark and Banjo-Kazooie store most of their assets as a short header
//! followed by a stream of LZ77 back-references and literals, entropy coded with canonical
//! Huffman codes and split into stored, fixed-table and dynamic-table blocks. This crate
//! decodes and encodes those streams bit-exactly:
//!
//! - [`Decompressor`] walks the blocks of a stream, decoding codes one bit at a time through
//!   flattened decode tries built by [`DecodeTable::build`].
//! - [`Compressor`] finds matches with a hash chain, parses them greedily and writes stored,
//!   fixed or dynamic blocks.
//! - [`Codec`] binds a buffer, a [`Profile`] and [`Options`] together and is the usual entry
//!   point. [`scan_assets`] and [`FrameHeader`] deal with the per-asset headers found in ROMs.
//!
//! ```
//! use gecompress::{Codec, CompressionType, Profile};
//!
//! let data = b"Agent 007, Agent 007, Agent 007".to_vec();
//! let mut codec = Codec::new(Profile::GoldenEye);
//!
//! codec.set_input_buffer(&data);
//! let compressed = codec.compress(CompressionType::Dynamic)?;
//!
//! codec.set_compressed_buffer(&compressed, Some(data.len()));
//! assert_eq!(codec.decompress()?, data);
//! # Ok::<(), gecompress::CodecError>(())
//! ```

#![forbid(unsafe_code)]

mod codec;
mod compress;
mod decompress;
mod error;
mod frame;
mod huffman;
mod profile;
mod tables;

pub use codec::Codec;
pub use compress::{compress_to_vec, Compressor};
pub use decompress::{decompress_to_vec, Decompressor};
pub use error::CodecError;
pub use frame::{normalize_rom_byte_order, scan_assets, FoundAsset, FrameHeader, RomByteOrder};
pub use huffman::{
    build_fixed, DecodeTable, DynamicTables, TableEntry, TableKind, DEFAULT_MAX_TABLE_ENTRIES,
};
pub use profile::{FixedLengths, FrameLayout, Profile};

/// Compression level used when none is configured.
pub const DEFAULT_LEVEL: u8 = 6;

/// Output cap applied when the caller does not know the decompressed size.
pub const DEFAULT_MAX_OUTPUT: usize = 0x90000;

/// How a block, or a whole stream produced by the encoder, is coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionType {
    /// Bytes copied verbatim after a length header.
    Stored = 0,
    /// Huffman coded with the profile's constant tables.
    Fixed = 1,
    /// Huffman coded with tables described in the block header.
    Dynamic = 2,
}

impl CompressionType {
    pub const ALL: [CompressionType; 3] = [
        CompressionType::Stored,
        CompressionType::Fixed,
        CompressionType::Dynamic,
    ];

    pub(crate) fn from_block_tag(tag: u8) -> Result<Self, CodecError> {
        Self::ALL
            .get(tag as usize)
            .copied()
            .ok_or(CodecError::UnsupportedBlockType(tag))
    }
}

impl TryFrom<u8> for CompressionType {
    type Error = CodecError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_block_tag(id)
    }
}

/// Tuning knobs and resource limits for a [`Codec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Match search effort from 1 (fastest) to 9 (smallest output).
    pub level: u8,
    /// Largest output a decode may produce when no expected size is given.
    pub max_output: usize,
    /// Ceiling on the number of entries in a single decode table.
    pub max_table_entries: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            max_output: DEFAULT_MAX_OUTPUT,
            max_table_entries: DEFAULT_MAX_TABLE_ENTRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_type_ids() {
        for (id, ty) in CompressionType::ALL.iter().enumerate() {
            assert_eq!(CompressionType::try_from(id as u8).unwrap(), *ty);
            assert_eq!(*ty as u8, id as u8);
        }
        assert!(matches!(
            CompressionType::try_from(3),
            Err(CodecError::UnsupportedBlockType(3))
        ));
    }

    #[test]
    fn default_options() {
        let options = Options::default();
        assert_eq!(options.level, 6);
        assert_eq!(options.max_output, 0x90000);
        assert_eq!(options.max_table_entries, 1024);
    }
}
