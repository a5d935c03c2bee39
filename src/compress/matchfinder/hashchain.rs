use crate::tables::{MIN_MATCH, WINDOW_SIZE};

use super::{compute_hash3, match_length, Match};

const CACHE_SIZE: usize = 1 << 16;

/// Hash chain match finder.
///
/// `hash_table` holds the most recent position (plus one, so zero means empty) for each hash,
/// and `links` chains every position to the previous one with the same hash.
pub(crate) struct HashChainMatchFinder {
    hash_table: Box<[u32]>,
    links: Box<[u32]>,

    /// Maximum number of chain entries to visit per lookup.
    search_depth: u16,
    /// Stop searching for matches if the length is at least this long.
    nice_length: u16,
}
impl HashChainMatchFinder {
    pub(crate) fn new(search_depth: u16, nice_length: u16) -> Self {
        assert!(search_depth > 0);

        Self {
            hash_table: vec![0; CACHE_SIZE].into_boxed_slice(),
            links: vec![0; WINDOW_SIZE].into_boxed_slice(),
            search_depth,
            nice_length,
        }
    }

    /// Finds the longest match for the data at `ip`, then records `ip` in the chains.
    ///
    /// Positions must be passed in increasing order, each exactly once across calls to this
    /// method and [`Self::insert`].
    pub(crate) fn get_and_insert(&mut self, data: &[u8], ip: usize) -> Match {
        if ip + MIN_MATCH > data.len() {
            return Match::empty();
        }

        let hash_index = compute_hash3(data, ip) as usize % CACHE_SIZE;
        let min_offset = ip.saturating_sub(WINDOW_SIZE);

        let mut best_length = MIN_MATCH - 1;
        let mut best_offset = 0;

        let mut n = self.search_depth;
        let mut entry = self.hash_table[hash_index] as usize;

        // Visit previous matches
        while entry != 0 {
            let offset = entry - 1;
            if offset < min_offset {
                break;
            }

            let length = match_length(data, offset, ip);
            if length > best_length {
                best_length = length;
                best_offset = offset;
            }
            if length >= self.nice_length as usize || ip + length == data.len() {
                break;
            }

            n -= 1;
            if n == 0 {
                break;
            }

            entry = self.links[offset % WINDOW_SIZE] as usize;
        }

        // Insert current value
        self.links[ip % WINDOW_SIZE] = self.hash_table[hash_index];
        self.hash_table[hash_index] = ip as u32 + 1;

        if best_length >= MIN_MATCH {
            return Match::new(best_length as u16, (ip - best_offset) as u16, ip);
        }
        Match::empty()
    }

    pub(crate) fn insert(&mut self, data: &[u8], ip: usize) {
        if ip + MIN_MATCH > data.len() {
            return;
        }
        let hash_index = compute_hash3(data, ip) as usize % CACHE_SIZE;
        self.links[ip % WINDOW_SIZE] = self.hash_table[hash_index];
        self.hash_table[hash_index] = ip as u32 + 1;
    }
}
