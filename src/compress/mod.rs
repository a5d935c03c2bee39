mod bitstream;
pub(crate) mod bitwriter;

mod matchfinder;
mod parse;

use std::io::{self, Write};

use tracing::debug;

pub(crate) use bitwriter::BitWriter;
use matchfinder::HashChainMatchFinder;
use parse::GreedyParser;

use crate::{profile::Profile, CompressionType};

/// Compressor producing raw streams in the block format of a game profile.
#[derive(Debug, Clone)]
pub struct Compressor {
    profile: Profile,
    block_type: CompressionType,
    level: u8,
}

impl Compressor {
    /// Create a new compressor.
    ///
    /// `level` only affects fixed and dynamic blocks: values 1-9 trade speed for a more
    /// thorough match search, 0 is treated as 1.
    pub fn new(profile: Profile, block_type: CompressionType, level: u8) -> Self {
        Self {
            profile,
            block_type,
            level,
        }
    }

    fn match_finder(&self) -> HashChainMatchFinder {
        match self.level {
            0..=1 => HashChainMatchFinder::new(4, 16),
            2 => HashChainMatchFinder::new(8, 16),
            3 => HashChainMatchFinder::new(8, 32),
            4 => HashChainMatchFinder::new(16, 32),
            5 => HashChainMatchFinder::new(32, 64),
            6 => HashChainMatchFinder::new(128, 128),
            7 => HashChainMatchFinder::new(256, 128),
            8..=u8::MAX => HashChainMatchFinder::new(1024, 258),
        }
    }

    /// Compresses `data` in full and returns the inner writer.
    pub fn compress<W: Write>(&self, writer: W, data: &[u8]) -> io::Result<W> {
        let mut writer = BitWriter::new(writer);

        match self.block_type {
            CompressionType::Stored => bitstream::write_stored(&mut writer, data, true)?,
            CompressionType::Fixed | CompressionType::Dynamic => {
                let mut parser = GreedyParser::new(self.match_finder());
                parser.parse(data, |symbols, last| {
                    debug!(
                        block_type = ?self.block_type,
                        symbols = symbols.len(),
                        last,
                        "writing block"
                    );
                    if self.block_type == CompressionType::Fixed {
                        bitstream::write_fixed_block(&mut writer, data, symbols, self.profile, last)
                    } else {
                        bitstream::write_dynamic_block(&mut writer, data, symbols, last)
                    }
                })?;
            }
        }

        writer.flush()?;
        Ok(writer.take())
    }

    /// Compresses the given data.
    pub fn compress_to_vec(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        self.compress(Vec::with_capacity(data.len() / 4 + 16), data)
    }
}

/// Compresses `data` with the given block type at the default level.
pub fn compress_to_vec(
    data: &[u8],
    profile: Profile,
    block_type: CompressionType,
) -> io::Result<Vec<u8>> {
    Compressor::new(profile, block_type, crate::DEFAULT_LEVEL).compress_to_vec(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::decompress_to_vec;
    use rand::Rng;

    const LIMIT: usize = 1 << 24;

    fn roundtrip(data: &[u8]) {
        for profile in Profile::ALL {
            for block_type in CompressionType::ALL {
                let compressed = compress_to_vec(data, profile, block_type).unwrap();
                let decompressed = decompress_to_vec(&compressed, profile, LIMIT).unwrap();
                assert_eq!(&decompressed, data, "{:?} {:?}", profile, block_type);
            }
        }
    }

    fn oracle_roundtrip(data: &[u8], level: u8) {
        for block_type in CompressionType::ALL {
            let compressed = Compressor::new(Profile::GoldenEye, block_type, level)
                .compress_to_vec(data)
                .unwrap();
            let decompressed = miniz_oxide::inflate::decompress_to_vec(&compressed).unwrap();
            assert_eq!(&decompressed, data, "{:?} level {}", block_type, level);
        }
    }

    #[test]
    fn it_works() {
        roundtrip(b"Hello world!");
    }

    #[test]
    fn empty() {
        roundtrip(&[]);
        oracle_roundtrip(&[], 6);
    }

    #[test]
    fn constant() {
        roundtrip(&vec![0; 2048]);
        roundtrip(&vec![5; 2048]);
        roundtrip(&vec![128; 2048]);
        roundtrip(&vec![254; 2048]);
    }

    #[test]
    fn run_of_a() {
        let data = [0x41u8; 1000];
        let compressed = compress_to_vec(&data, Profile::GoldenEye, CompressionType::Fixed).unwrap();
        assert!(compressed.len() < 20, "{} bytes", compressed.len());

        let decompressed = decompress_to_vec(&compressed, Profile::GoldenEye, LIMIT).unwrap();
        assert_eq!(decompressed.len(), 1000);
        assert!(decompressed.iter().all(|&b| b == 0x41));
    }

    #[test]
    fn stored_size() {
        for len in [0, 1, 100, 65535, 65536, 200_000] {
            let data = vec![0x5a; len];
            let compressed =
                compress_to_vec(&data, Profile::GoldenEye, CompressionType::Stored).unwrap();
            let blocks = ((len + 65534) / 65535).max(1);
            assert_eq!(compressed.len(), len + 5 * blocks);
        }
    }

    #[test]
    fn random() {
        let mut rng = rand::thread_rng();
        let mut data = vec![0; 2048];
        for _ in 0..10 {
            for byte in &mut data {
                *byte = rng.gen();
            }
            roundtrip(&data);
        }
    }

    #[test]
    fn multiple_blocks() {
        let mut rng = rand::thread_rng();
        let mut data = vec![0u8; 512 * 1024];
        for byte in &mut data {
            *byte = match rng.gen_range(0..100) {
                0..=29 => rng.gen(),
                30..=69 => rng.gen_range(b'a'..=b'd'),
                _ => 0,
            };
        }
        roundtrip(&data);
        for level in [1, 6, 9] {
            oracle_roundtrip(&data, level);
        }
    }

    #[test]
    fn text() {
        let mut data = Vec::new();
        for i in 0..2000 {
            data.extend_from_slice(format!("line {} of the setup file; ", i % 37).as_bytes());
        }
        roundtrip(&data);
        oracle_roundtrip(&data, 6);

        let dynamic = compress_to_vec(&data, Profile::GoldenEye, CompressionType::Dynamic).unwrap();
        let fixed = compress_to_vec(&data, Profile::GoldenEye, CompressionType::Fixed).unwrap();
        assert!(dynamic.len() < fixed.len());
        assert!(fixed.len() < data.len() / 4);
    }
}
