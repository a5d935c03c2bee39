/// Order in which the code length code lengths are transmitted.
pub(crate) const CLCL_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Base copy length of each length symbol (257..=285).
pub(crate) const LEN_SYM_TO_LEN_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Number of extra bits following each length symbol.
pub(crate) const LEN_SYM_TO_LEN_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

pub(crate) const DIST_SYM_TO_DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub(crate) const DIST_SYM_TO_DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

#[rustfmt::skip]
pub(crate) const BITMASKS: [u32; 17] = [
    0x0000, 0x0001, 0x0003, 0x0007, 0x000F, 0x001F, 0x003F, 0x007F, 0x00FF,
    0x01FF, 0x03FF, 0x07FF, 0x0FFF, 0x1FFF, 0x3FFF, 0x7FFF, 0xFFFF
];

/// Maps a copy length (3..=258) to its index into the length symbol tables.
pub(crate) const LENGTH_TO_SYMBOL: [u8; 256] = {
    let mut table = [0u8; 256];
    let mut sym = 0;
    while sym < 28 {
        let base = LEN_SYM_TO_LEN_BASE[sym] as usize;
        let count = 1 << LEN_SYM_TO_LEN_EXTRA[sym];
        let mut i = 0;
        while i < count {
            table[base - 3 + i] = sym as u8;
            i += 1;
        }
        sym += 1;
    }
    // 258 has a dedicated symbol rather than the last slot of symbol 284.
    table[255] = 28;
    table
};

/// Literal/length symbol that marks the end of a block.
pub(crate) const END_OF_BLOCK: usize = 256;

/// Largest back-reference distance the format can express.
pub(crate) const WINDOW_SIZE: usize = 32768;

pub(crate) const MIN_MATCH: usize = 3;
pub(crate) const MAX_MATCH: usize = 258;
