//! Methods for encoding the block bitstream.

use std::{
    collections::BinaryHeap,
    io::{self, Write},
};

use crate::{
    compress::BitWriter,
    huffman::compute_codes,
    profile::Profile,
    tables::{
        BITMASKS, CLCL_ORDER, DIST_SYM_TO_DIST_BASE, DIST_SYM_TO_DIST_EXTRA, END_OF_BLOCK,
        LENGTH_TO_SYMBOL, LEN_SYM_TO_LEN_EXTRA,
    },
};

pub(crate) const STORED_BLOCK_MAX_SIZE: usize = u16::MAX as usize;

pub(crate) fn distance_to_dist_sym(distance: u16) -> u8 {
    const LOOKUP: [u8; 16] = [0, 1, 2, 3, 4, 4, 5, 5, 6, 6, 6, 6, 7, 7, 7, 7];
    if distance <= 16 {
        return LOOKUP[distance as usize - 1];
    }

    let mut dist_sym = 29;
    while dist_sym > 0 && distance < DIST_SYM_TO_DIST_BASE[dist_sym as usize] {
        dist_sym -= 1;
    }
    dist_sym
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Symbol {
    LiteralRun {
        start: u32,
        end: u32,
    },
    Backref {
        length: u16,
        distance: u16,
        dist_sym: u8,
    },
}

/// Literal/length and distance codes for one block.
struct BlockCodes {
    lengths: [u8; 288],
    codes: [u16; 288],
    dist_lengths: [u8; 32],
    dist_codes: [u16; 32],
}

impl BlockCodes {
    fn fixed(profile: Profile) -> Self {
        let fixed = profile.fixed_lengths();
        Self {
            lengths: fixed.litlen,
            codes: compute_codes(&fixed.litlen),
            dist_lengths: fixed.dist,
            dist_codes: compute_codes(&fixed.dist),
        }
    }
}

fn block_header<W: Write>(writer: &mut BitWriter<W>, block_type: u64, eof: bool) -> io::Result<()> {
    writer.write_bits(u64::from(eof) | block_type << 1, 3)
}

/// Writes `data` as one or more stored blocks; empty input still produces one block.
pub(crate) fn write_stored<W: Write>(
    writer: &mut BitWriter<W>,
    data: &[u8],
    eof: bool,
) -> io::Result<()> {
    let mut chunks = data.chunks(STORED_BLOCK_MAX_SIZE).peekable();
    if chunks.peek().is_none() {
        return write_stored_block(writer, &[], eof);
    }
    while let Some(chunk) = chunks.next() {
        write_stored_block(writer, chunk, eof && chunks.peek().is_none())?;
    }
    Ok(())
}

fn write_stored_block<W: Write>(
    writer: &mut BitWriter<W>,
    chunk: &[u8],
    eof: bool,
) -> io::Result<()> {
    debug_assert!(chunk.len() <= STORED_BLOCK_MAX_SIZE);
    block_header(writer, 0b00, eof)?;
    let writer = writer.flush()?;
    writer.write_all(&(chunk.len() as u16).to_le_bytes())?;
    writer.write_all(&(!(chunk.len() as u16)).to_le_bytes())?;
    writer.write_all(chunk)
}

/// Writes a fixed-table block using the profile's constant codes.
pub(crate) fn write_fixed_block<W: Write>(
    writer: &mut BitWriter<W>,
    data: &[u8],
    symbols: &[Symbol],
    profile: Profile,
    eof: bool,
) -> io::Result<()> {
    let codes = BlockCodes::fixed(profile);
    block_header(writer, 0b01, eof)?;
    write_symbols(writer, data, symbols, &codes)
}

/// Writes a dynamic-table block with codes fitted to the block's own symbol frequencies.
pub(crate) fn write_dynamic_block<W: Write>(
    writer: &mut BitWriter<W>,
    data: &[u8],
    symbols: &[Symbol],
    eof: bool,
) -> io::Result<()> {
    let mut frequencies = [0u32; 286];
    let mut dist_frequencies = [0u32; 30];
    frequencies[END_OF_BLOCK] = 1;

    for symbol in symbols {
        match symbol {
            Symbol::LiteralRun { start, end } => {
                for &lit in &data[*start as usize..*end as usize] {
                    frequencies[lit as usize] += 1;
                }
            }
            Symbol::Backref {
                length, dist_sym, ..
            } => {
                let sym = 257 + LENGTH_TO_SYMBOL[*length as usize - 3] as usize;
                frequencies[sym] += 1;
                dist_frequencies[*dist_sym as usize] += 1;
            }
        }
    }

    // Blocks without matches still get a one-code distance tree.
    if dist_frequencies.iter().all(|&f| f == 0) {
        dist_frequencies[0] = 1;
    }

    let mut block = BlockCodes {
        lengths: [0; 288],
        codes: [0; 288],
        dist_lengths: [0; 32],
        dist_codes: [0; 32],
    };
    build_huffman_tree(&frequencies, &mut block.lengths[..286], 15);
    build_huffman_tree(&dist_frequencies, &mut block.dist_lengths[..30], 15);
    block.codes = compute_codes(&block.lengths);
    block.dist_codes = compute_codes(&block.dist_lengths);

    let mut num_litlen_codes = 286;
    while num_litlen_codes > 257 && block.lengths[num_litlen_codes - 1] == 0 {
        num_litlen_codes -= 1;
    }

    let mut num_dist_codes = 30;
    while num_dist_codes > 1 && block.dist_lengths[num_dist_codes - 1] == 0 {
        num_dist_codes -= 1;
    }

    let mut all_lengths = Vec::with_capacity(num_litlen_codes + num_dist_codes);
    all_lengths.extend_from_slice(&block.lengths[..num_litlen_codes]);
    all_lengths.extend_from_slice(&block.dist_lengths[..num_dist_codes]);
    let runs = run_length_encode(&all_lengths);

    let mut code_length_frequencies = [0u32; 19];
    for &(symbol, _) in &runs {
        code_length_frequencies[symbol as usize] += 1;
    }
    // The code length code must be complete, which takes at least two codes.
    if code_length_frequencies.iter().filter(|&&f| f > 0).count() < 2 {
        let unused = code_length_frequencies
            .iter()
            .position(|&f| f == 0)
            .unwrap_or(0);
        code_length_frequencies[unused] = 1;
    }
    let mut code_length_lengths = [0u8; 19];
    build_huffman_tree(&code_length_frequencies, &mut code_length_lengths, 7);
    let code_length_codes = compute_codes(&code_length_lengths);

    let mut num_code_length_codes = 19;
    while num_code_length_codes > 4 && code_length_lengths[CLCL_ORDER[num_code_length_codes - 1]] == 0
    {
        num_code_length_codes -= 1;
    }

    block_header(writer, 0b10, eof)?;
    writer.write_bits(num_litlen_codes as u64 - 257, 5)?; // hlit
    writer.write_bits(num_dist_codes as u64 - 1, 5)?; // hdist
    writer.write_bits(num_code_length_codes as u64 - 4, 4)?; // hclen

    for &symbol in &CLCL_ORDER[..num_code_length_codes] {
        writer.write_bits(code_length_lengths[symbol] as u64, 3)?;
    }

    for &(symbol, extra) in &runs {
        writer.write_bits(
            code_length_codes[symbol as usize] as u64,
            code_length_lengths[symbol as usize],
        )?;
        match symbol {
            16 => writer.write_bits(extra as u64, 2)?,
            17 => writer.write_bits(extra as u64, 3)?,
            18 => writer.write_bits(extra as u64, 7)?,
            _ => {}
        }
    }

    write_symbols(writer, data, symbols, &block)
}

fn write_symbols<W: Write>(
    writer: &mut BitWriter<W>,
    data: &[u8],
    symbols: &[Symbol],
    block: &BlockCodes,
) -> io::Result<()> {
    let codes = &block.codes;
    let lengths = &block.lengths;

    for symbol in symbols {
        match symbol {
            Symbol::LiteralRun { start, end } => {
                for &lit in &data[*start as usize..*end as usize] {
                    writer.write_bits(codes[lit as usize] as u64, lengths[lit as usize])?;
                }
            }
            Symbol::Backref {
                length,
                distance,
                dist_sym,
            } => {
                let len_sym = LENGTH_TO_SYMBOL[*length as usize - 3] as usize;
                let sym = 257 + len_sym;
                writer.write_bits(codes[sym] as u64, lengths[sym])?;
                let len_extra = LEN_SYM_TO_LEN_EXTRA[len_sym];
                let extra = (((*length as u32) - 3) & BITMASKS[len_extra as usize]) as u64;
                writer.write_bits(extra, len_extra)?;

                writer.write_bits(
                    block.dist_codes[*dist_sym as usize] as u64,
                    block.dist_lengths[*dist_sym as usize],
                )?;
                let dist_extra = DIST_SYM_TO_DIST_EXTRA[*dist_sym as usize];
                let extra = *distance - DIST_SYM_TO_DIST_BASE[*dist_sym as usize];

                writer.write_bits(extra as u64, dist_extra)?;
            }
        }
    }
    writer.write_bits(codes[END_OF_BLOCK] as u64, lengths[END_OF_BLOCK])
}

/// Run-length encodes a code length sequence into `(symbol, extra bits value)` pairs using
/// symbols 16 (repeat previous), 17 (short zero run) and 18 (long zero run).
fn run_length_encode(lengths: &[u8]) -> Vec<(u8, u8)> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i < lengths.len() {
        let length = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == length {
            run += 1;
        }
        i += run;

        if length == 0 {
            while run >= 11 {
                let n = run.min(138);
                runs.push((18, (n - 11) as u8));
                run -= n;
            }
            if run >= 3 {
                runs.push((17, (run - 3) as u8));
                run = 0;
            }
        } else {
            runs.push((length, 0));
            run -= 1;
            while run >= 3 {
                let n = run.min(6);
                runs.push((16, (n - 3) as u8));
                run -= n;
            }
        }
        runs.extend(std::iter::repeat((length, 0)).take(run));
    }
    runs
}

/// Computes length-limited Huffman code lengths for `frequencies`.
///
/// A single used symbol gets a one-bit code; no used symbols leaves every length at zero.
pub(crate) fn build_huffman_tree(frequencies: &[u32], lengths: &mut [u8], length_limit: u8) {
    assert_eq!(frequencies.len(), lengths.len());

    lengths.fill(0);
    if frequencies.iter().filter(|&&f| f > 0).count() <= 1 {
        if let Some(i) = frequencies.iter().position(|&f| f > 0) {
            lengths[i] = 1;
        }
        return;
    }

    #[derive(Eq, PartialEq, Copy, Clone, Debug)]
    struct Item(u32, u16);
    impl Ord for Item {
        fn cmp(&self, other: &Self) -> std::cmp::Ordering {
            other.0.cmp(&self.0).then_with(|| other.1.cmp(&self.1))
        }
    }
    impl PartialOrd for Item {
        fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
            Some(self.cmp(other))
        }
    }

    // Build a huffman tree
    let mut internal_nodes = Vec::new();
    let mut nodes: BinaryHeap<Item> = frequencies
        .iter()
        .enumerate()
        .filter(|(_, &frequency)| frequency > 0)
        .map(|(i, &frequency)| Item(frequency, i as u16))
        .collect();
    while nodes.len() > 1 {
        if let (Some(Item(frequency1, index1)), Some(mut root)) = (nodes.pop(), nodes.peek_mut())
        {
            internal_nodes.push((index1, root.1));
            *root = Item(
                frequency1 + root.0,
                internal_nodes.len() as u16 + frequencies.len() as u16 - 1,
            );
        }
    }

    // Walk the tree to assign code lengths
    let mut stack = Vec::new();
    if let Some(root) = nodes.pop() {
        stack.push((root.1, 0));
    }
    while let Some((node, depth)) = stack.pop() {
        let node = node as usize;
        if node < frequencies.len() {
            lengths[node] = depth as u8;
        } else {
            let (left, right) = internal_nodes[node - frequencies.len()];
            stack.push((left, depth + 1));
            stack.push((right, depth + 1));
        }
    }

    // Limit the codes to length length_limit
    let max_length = lengths.iter().copied().max().unwrap_or(0);
    if max_length > length_limit {
        let mut counts = [0u32; 16];
        for &length in lengths.iter() {
            counts[length.min(length_limit) as usize] += 1;
        }

        let mut total = 0;
        for (i, count) in counts
            .iter()
            .enumerate()
            .skip(1)
            .take(length_limit as usize)
        {
            total += count << (length_limit as usize - i);
        }

        while total > 1u32 << length_limit {
            let mut i = length_limit as usize - 1;
            while counts[i] == 0 {
                i -= 1;
            }
            counts[i] -= 1;
            counts[length_limit as usize] -= 1;
            counts[i + 1] += 2;
            total -= 1;
        }

        // assign new lengths
        let mut len = length_limit;
        let mut indexes = frequencies.iter().copied().enumerate().collect::<Vec<_>>();
        indexes.sort_unstable_by_key(|&(_, frequency)| frequency);
        for &(i, frequency) in indexes.iter() {
            if frequency > 0 {
                while counts[len as usize] == 0 {
                    len -= 1;
                }
                lengths[i] = len;
                counts[len as usize] -= 1;
            }
        }
    }
}
