use crate::compress::{
    bitstream::{self, Symbol},
    matchfinder::{HashChainMatchFinder, Match},
};

/// Number of symbols collected before a block is emitted.
pub(crate) const BLOCK_SYMBOLS: usize = 16384;

/// Greedy LZ77 parser: always takes the longest match at the current position.
pub(crate) struct GreedyParser {
    match_finder: HashChainMatchFinder,
}

impl GreedyParser {
    pub fn new(match_finder: HashChainMatchFinder) -> Self {
        Self { match_finder }
    }

    /// Tokenizes `data`, handing each batch of symbols to `emit` together with a flag telling
    /// whether it is the last one. `emit` is always called at least once.
    pub fn parse<E, F>(&mut self, data: &[u8], mut emit: F) -> Result<(), E>
    where
        F: FnMut(&[Symbol], bool) -> Result<(), E>,
    {
        let mut symbols = Vec::new();
        let mut ip = 0;
        let mut last_match = 0;

        while ip < data.len() {
            let m = self.match_finder.get_and_insert(data, ip);
            if m.is_empty() {
                ip += 1;
                continue;
            }

            assert!(last_match <= m.start);
            if m.start > last_match {
                symbols.push(Symbol::LiteralRun {
                    start: last_match as u32,
                    end: m.start as u32,
                });
            }
            symbols.push(backref(&m));

            // Insert match finder entries for the rest of the match.
            for j in ip + 1..m.end() {
                self.match_finder.insert(data, j);
            }
            ip = m.end();
            last_match = ip;

            // Write the block if we have enough symbols.
            if symbols.len() >= BLOCK_SYMBOLS && last_match < data.len() {
                emit(&symbols, false)?;
                symbols.clear();
            }
        }

        // Append a final literal run if there's remaining input.
        if last_match < data.len() {
            symbols.push(Symbol::LiteralRun {
                start: last_match as u32,
                end: data.len() as u32,
            });
        }

        emit(&symbols, true)
    }
}

fn backref(m: &Match) -> Symbol {
    Symbol::Backref {
        length: m.length,
        distance: m.distance,
        dist_sym: bitstream::distance_to_dist_sym(m.distance),
    }
}
