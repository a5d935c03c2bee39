use thiserror::Error;

/// Errors produced while building tables, decoding or encoding a stream.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bit cursor ran out of input before a read could be satisfied.
    #[error("input exhausted: needed {needed} more bits at bit offset {position}")]
    BufferUnderrun { needed: u32, position: u64 },
    /// A set of code lengths, or the run-length coded header describing them, is not a
    /// valid prefix code.
    #[error("malformed huffman table: {0}")]
    MalformedTable(&'static str),
    /// Building a decode table would exceed the configured entry ceiling.
    #[error("decode table exceeds {limit} entries")]
    TableOverflow { limit: usize },
    /// A block type (or requested compression type) outside of {0, 1, 2}.
    #[error("unsupported block type {0}")]
    UnsupportedBlockType(u8),
    #[error("unknown game profile {0}")]
    InvalidProfile(u8),
    /// Decoding produced more bytes than the caller allowed.
    #[error("output exceeds limit of {limit} bytes")]
    OutputOverflow { limit: usize },
    #[error("stored block length {len:#06x} does not match its complement {nlen:#06x}")]
    StoredLengthMismatch { len: u16, nlen: u16 },
    #[error("back-reference distance {distance} reaches before the start of the output ({available} bytes)")]
    DistanceTooFar { distance: usize, available: usize },
    /// The code walked into a symbol that has no meaning in this alphabet.
    #[error("invalid symbol in compressed stream")]
    InvalidSymbol,
    #[error("decoded {actual} bytes but expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    /// A block was requested after the final block of the stream.
    #[error("stream already ended")]
    StreamEnded,
    #[error("no buffer of the required kind is bound")]
    NoBufferBound,
    #[error("bad asset header magic {found:#06x}, expected {expected:#06x}")]
    BadMagic { expected: u16, found: u16 },
    #[error("unrecognized ROM byte order")]
    UnknownRomByteOrder,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
