//! Game profiles and the constant code tables they select.

use crate::CodecError;

/// Constant code lengths used by fixed-table blocks.
#[derive(Debug, PartialEq, Eq)]
pub struct FixedLengths {
    /// Literal/length alphabet, including the two reserved symbols 286 and 287.
    pub litlen: [u8; 288],
    /// Distance alphabet, including the two reserved symbols 30 and 31.
    pub dist: [u8; 32],
}

const fn standard_litlen() -> [u8; 288] {
    let mut lengths = [0u8; 288];
    let mut i = 0;
    while i < 288 {
        lengths[i] = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
        i += 1;
    }
    lengths
}

/// The table every supported title was built with.
static STANDARD_FIXED: FixedLengths = FixedLengths {
    litlen: standard_litlen(),
    dist: [5; 32],
};

/// How a compressed asset is introduced inside a ROM.
///
/// Only obtainable through [`Profile::frame`], so the size field is at most 4 bytes wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    magic: u16,
    size_field: Option<u8>,
}

impl FrameLayout {
    pub fn magic(self) -> u16 {
        self.magic
    }

    /// Width in bytes of the big-endian decompressed size that follows the magic, if any.
    pub fn size_field(self) -> Option<u8> {
        self.size_field
    }
}

/// Selects the fixed tables and format quirks of one title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Profile {
    #[default]
    GoldenEye = 0,
    PerfectDark = 1,
    BanjoKazooie = 2,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Profile::GoldenEye, Profile::PerfectDark, Profile::BanjoKazooie];

    pub fn fixed_lengths(self) -> &'static FixedLengths {
        match self {
            Profile::GoldenEye | Profile::PerfectDark | Profile::BanjoKazooie => &STANDARD_FIXED,
        }
    }

    pub fn frame(self) -> FrameLayout {
        match self {
            Profile::GoldenEye => FrameLayout {
                magic: 0x1172,
                size_field: None,
            },
            Profile::PerfectDark => FrameLayout {
                magic: 0x1173,
                size_field: Some(3),
            },
            Profile::BanjoKazooie => FrameLayout {
                magic: 0x1172,
                size_field: Some(4),
            },
        }
    }
}

impl TryFrom<u8> for Profile {
    type Error = CodecError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Profile::ALL
            .get(id as usize)
            .copied()
            .ok_or(CodecError::InvalidProfile(id))
    }
}
