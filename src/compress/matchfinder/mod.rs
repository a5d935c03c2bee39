mod hashchain;

pub(crate) use hashchain::HashChainMatchFinder;

use crate::tables::MAX_MATCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Match {
    pub length: u16,
    pub distance: u16,
    pub start: usize,
}
impl Match {
    pub fn new(length: u16, distance: u16, match_start: usize) -> Self {
        debug_assert!(length >= 3, "Match length must be at least 3");
        Self {
            length,
            distance,
            start: match_start,
        }
    }

    pub fn empty() -> Self {
        Self {
            length: 0,
            distance: 0,
            start: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn end(&self) -> usize {
        self.start + self.length as usize
    }
}

/// Hashes the three bytes starting at `ip`.
fn compute_hash3(data: &[u8], ip: usize) -> u32 {
    let v = u32::from(data[ip]) | u32::from(data[ip + 1]) << 8 | u32::from(data[ip + 2]) << 16;
    (2654435761u32.wrapping_mul(v)) >> 16
}

/// Length of the common prefix of the data at `prev_index` and `ip`, up to the maximum match
/// length. The two ranges may overlap.
fn match_length(data: &[u8], prev_index: usize, ip: usize) -> usize {
    assert!(
        prev_index < ip,
        "Match past current position: {prev_index} {ip}"
    );

    let max = MAX_MATCH.min(data.len() - ip);
    let mut length = 0;
    while length < max && data[prev_index + length] == data[ip + length] {
        length += 1;
    }
    length
}
