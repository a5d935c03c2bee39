//! Asset headers and ROM level helpers.

use std::io::Write;

use tracing::{debug, trace};

use crate::{profile::FrameLayout, CodecError, Decompressor, Options, Profile};

/// Candidates declaring a larger decompressed size are not assets.
const MAX_DECLARED_SIZE: usize = 5 * 1024 * 1024;

/// The header in front of a compressed asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: u16,
    /// Decompressed size, for layouts that carry one.
    pub decompressed_size: Option<usize>,
}

impl FrameHeader {
    /// Number of bytes a header of this layout occupies.
    pub fn encoded_len(layout: FrameLayout) -> usize {
        2 + layout.size_field().unwrap_or(0) as usize
    }

    /// Parses the header at the start of `data`, returning it and its length in bytes.
    pub fn parse(layout: FrameLayout, data: &[u8]) -> Result<(Self, usize), CodecError> {
        let len = Self::encoded_len(layout);
        if data.len() < len {
            return Err(CodecError::BufferUnderrun {
                needed: ((len - data.len()) * 8) as u32,
                position: data.len() as u64 * 8,
            });
        }

        let magic = u16::from_be_bytes([data[0], data[1]]);
        if magic != layout.magic() {
            return Err(CodecError::BadMagic {
                expected: layout.magic(),
                found: magic,
            });
        }

        let decompressed_size = layout.size_field().map(|width| {
            data[2..2 + width as usize]
                .iter()
                .fold(0usize, |size, &byte| size << 8 | byte as usize)
        });

        Ok((
            Self {
                magic,
                decompressed_size,
            },
            len,
        ))
    }

    /// Writes the header for an asset that decompresses to `size` bytes.
    pub fn write<W: Write>(layout: FrameLayout, size: usize, writer: &mut W) -> Result<(), CodecError> {
        writer.write_all(&layout.magic().to_be_bytes())?;
        if let Some(width) = layout.size_field() {
            let limit = (1u64 << (8 * width as u32)) - 1;
            if size as u64 > limit {
                return Err(CodecError::OutputOverflow {
                    limit: limit as usize,
                });
            }
            writer.write_all(&(size as u64).to_be_bytes()[8 - width as usize..])?;
        }
        Ok(())
    }
}

/// An asset located by [`scan_assets`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundAsset {
    /// Offset of the asset header within the ROM.
    pub offset: usize,
    /// Length of the compressed stream following the header.
    pub compressed_len: usize,
    pub data: Vec<u8>,
}

/// Finds every asset of `profile` in a big-endian ROM image.
///
/// Each occurrence of the magic is tried as a header. Candidates that fail to decode, decode
/// to nothing or disagree with their declared size are skipped, and scanning resumes after the
/// end of every asset that was found.
pub fn scan_assets(rom: &[u8], profile: Profile, options: &Options) -> Vec<FoundAsset> {
    let layout = profile.frame();
    let magic = layout.magic().to_be_bytes();
    let mut assets = Vec::new();

    let mut offset = 0;
    while offset + 2 <= rom.len() {
        if rom[offset..offset + 2] != magic {
            offset += 1;
            continue;
        }

        match decode_candidate(&rom[offset..], layout, profile, options) {
            Ok((compressed_len, data)) => {
                debug!(offset, compressed_len, len = data.len(), "found asset");
                let header_len = FrameHeader::encoded_len(layout);
                assets.push(FoundAsset {
                    offset,
                    compressed_len,
                    data,
                });
                offset += header_len + compressed_len;
            }
            Err(err) => {
                trace!(offset, %err, "rejected asset candidate");
                offset += 1;
            }
        }
    }

    assets
}

fn decode_candidate(
    data: &[u8],
    layout: FrameLayout,
    profile: Profile,
    options: &Options,
) -> Result<(usize, Vec<u8>), CodecError> {
    let (header, header_len) = FrameHeader::parse(layout, data)?;
    let limit = match header.decompressed_size {
        Some(size) if size > MAX_DECLARED_SIZE => {
            return Err(CodecError::OutputOverflow {
                limit: MAX_DECLARED_SIZE,
            })
        }
        Some(size) => size,
        None => options.max_output,
    };

    let mut decompressor = Decompressor::new(&data[header_len..], profile, limit)
        .with_max_table_entries(options.max_table_entries);
    while !decompressor.done() {
        decompressor.read_block()?;
    }
    let compressed_len = decompressor.bytes_consumed();
    let output = decompressor.finish()?;

    if let Some(expected) = header.decompressed_size {
        if output.len() != expected {
            return Err(CodecError::SizeMismatch {
                expected,
                actual: output.len(),
            });
        }
    }
    if output.is_empty() {
        return Err(CodecError::SizeMismatch {
            expected: 1,
            actual: 0,
        });
    }
    Ok((compressed_len, output))
}

/// Byte order of a ROM image, named after the usual file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomByteOrder {
    /// `.z64`, native big-endian.
    BigEndian,
    /// `.v64`, every 16-bit word swapped.
    ByteSwapped,
    /// `.n64`, every 32-bit word reversed.
    LittleEndian,
}

/// Rewrites `rom` in place to big-endian order and returns the order it was in.
///
/// The order is detected from the first word of the cartridge header.
pub fn normalize_rom_byte_order(rom: &mut [u8]) -> Result<RomByteOrder, CodecError> {
    let order = match rom.get(..4) {
        Some([0x80, 0x37, 0x12, 0x40]) => RomByteOrder::BigEndian,
        Some([0x37, 0x80, 0x40, 0x12]) => RomByteOrder::ByteSwapped,
        Some([0x40, 0x12, 0x37, 0x80]) => RomByteOrder::LittleEndian,
        _ => return Err(CodecError::UnknownRomByteOrder),
    };

    match order {
        RomByteOrder::BigEndian => {}
        RomByteOrder::ByteSwapped => rom.chunks_exact_mut(2).for_each(|word| word.swap(0, 1)),
        RomByteOrder::LittleEndian => rom.chunks_exact_mut(4).for_each(|word| word.reverse()),
    }
    debug!(?order, len = rom.len(), "normalized rom byte order");
    Ok(order)
}
