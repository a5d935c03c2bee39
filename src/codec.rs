use tracing::debug;

use crate::{
    frame::FrameHeader, CodecError, CompressionType, Compressor, Decompressor, Options, Profile,
};

/// The buffer a [`Codec`] will operate on next.
#[derive(Debug, Clone, Copy)]
enum Bound<'a> {
    Nothing,
    Input(&'a [u8]),
    Compressed {
        data: &'a [u8],
        expected_len: Option<usize>,
    },
}

/// Binds a buffer, a game profile and options, and runs whole compress or decompress
/// operations over them.
///
/// Only one buffer is bound at a time: binding an input buffer replaces a bound compressed
/// buffer and vice versa.
#[derive(Debug, Clone)]
pub struct Codec<'a> {
    profile: Profile,
    options: Options,
    bound: Bound<'a>,
}

impl<'a> Codec<'a> {
    pub fn new(profile: Profile) -> Self {
        Self::with_options(profile, Options::default())
    }

    pub fn with_options(profile: Profile, options: Options) -> Self {
        Self {
            profile,
            options,
            bound: Bound::Nothing,
        }
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Selects the profile used by subsequent operations.
    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Binds uncompressed data for [`Self::compress`].
    pub fn set_input_buffer(&mut self, data: &'a [u8]) {
        self.bound = Bound::Input(data);
    }

    /// Binds a compressed stream for [`Self::decompress`].
    ///
    /// When `expected_len` is given the stream must decode to exactly that many bytes,
    /// otherwise decoding is capped at [`Options::max_output`].
    pub fn set_compressed_buffer(&mut self, data: &'a [u8], expected_len: Option<usize>) {
        self.bound = Bound::Compressed { data, expected_len };
    }

    fn input(&self) -> Result<&'a [u8], CodecError> {
        match self.bound {
            Bound::Input(data) => Ok(data),
            _ => Err(CodecError::NoBufferBound),
        }
    }

    fn compressed(&self) -> Result<(&'a [u8], Option<usize>), CodecError> {
        match self.bound {
            Bound::Compressed { data, expected_len } => Ok((data, expected_len)),
            _ => Err(CodecError::NoBufferBound),
        }
    }

    /// Compresses the bound input buffer into a stream of `compression` blocks.
    pub fn compress(&self, compression: CompressionType) -> Result<Vec<u8>, CodecError> {
        let data = self.input()?;
        self.encode(data, compression)
    }

    /// Compresses the bound input buffer with every block type and keeps the smallest result.
    pub fn compress_best(&self) -> Result<(CompressionType, Vec<u8>), CodecError> {
        let data = self.input()?;

        let mut best = (
            CompressionType::Stored,
            self.encode(data, CompressionType::Stored)?,
        );
        for compression in &CompressionType::ALL[1..] {
            let compressed = self.encode(data, *compression)?;
            if compressed.len() < best.1.len() {
                best = (*compression, compressed);
            }
        }

        debug!(
            compression = ?best.0,
            input_len = data.len(),
            output_len = best.1.len(),
            "picked smallest encoding"
        );
        Ok(best)
    }

    /// Decompresses the bound compressed buffer.
    pub fn decompress(&self) -> Result<Vec<u8>, CodecError> {
        let (data, expected_len) = self.compressed()?;
        self.decode(data, expected_len)
    }

    /// Like [`Self::compress`], with the profile's asset header in front of the stream.
    pub fn compress_framed(&self, compression: CompressionType) -> Result<Vec<u8>, CodecError> {
        let data = self.input()?;
        let mut out = Vec::new();
        FrameHeader::write(self.profile.frame(), data.len(), &mut out)?;
        Ok(Compressor::new(self.profile, compression, self.options.level).compress(out, data)?)
    }

    /// Decompresses a bound buffer that starts with the profile's asset header.
    ///
    /// The size declared in the header, if the profile has one, takes precedence over the
    /// expected length the buffer was bound with.
    pub fn decompress_framed(&self) -> Result<Vec<u8>, CodecError> {
        let (data, expected_len) = self.compressed()?;
        let (header, header_len) = FrameHeader::parse(self.profile.frame(), data)?;
        self.decode(
            &data[header_len..],
            header.decompressed_size.or(expected_len),
        )
    }

    fn encode(&self, data: &[u8], compression: CompressionType) -> Result<Vec<u8>, CodecError> {
        Ok(Compressor::new(self.profile, compression, self.options.level).compress_to_vec(data)?)
    }

    fn decode(&self, data: &[u8], expected_len: Option<usize>) -> Result<Vec<u8>, CodecError> {
        let limit = expected_len.unwrap_or(self.options.max_output);
        let output = Decompressor::new(data, self.profile, limit)
            .with_max_table_entries(self.options.max_table_entries)
            .finish()?;

        match expected_len {
            Some(expected) if output.len() != expected => Err(CodecError::SizeMismatch {
                expected,
                actual: output.len(),
            }),
            _ => Ok(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decompress::BitCursor, huffman, DEFAULT_MAX_TABLE_ENTRIES};
    use rand::Rng;

    fn roundtrip(profile: Profile, data: &[u8], compression: CompressionType) {
        let mut codec = Codec::new(profile);
        codec.set_input_buffer(data);
        let compressed = codec.compress(compression).unwrap();

        codec.set_compressed_buffer(&compressed, Some(data.len()));
        assert_eq!(codec.decompress().unwrap(), data);
        codec.set_compressed_buffer(&compressed, None);
        assert_eq!(codec.decompress().unwrap(), data);
    }

    fn sample() -> Vec<u8> {
        let mut rng = rand::thread_rng();
        let mut data = Vec::with_capacity(100_000);
        while data.len() < 100_000 {
            if rng.gen_bool(0.3) && data.len() > 300 {
                let start = rng.gen_range(0..data.len() - 300);
                let len = rng.gen_range(3..300);
                data.extend_from_within(start..start + len);
            } else {
                data.push(rng.gen_range(0..64));
            }
        }
        data
    }

    #[test]
    fn assert_send_sync() {
        fn is_send_sync<T: Send + Sync>() {}
        is_send_sync::<Codec>();
    }

    #[test]
    fn roundtrip_all_types() {
        let data = sample();
        for profile in Profile::ALL {
            for compression in CompressionType::ALL {
                roundtrip(profile, &data, compression);
            }
        }
    }

    #[test]
    fn empty_input() {
        for compression in CompressionType::ALL {
            roundtrip(Profile::PerfectDark, &[], compression);
        }
    }

    #[test]
    fn run_of_a() {
        let data = [0x41u8; 1000];
        let mut codec = Codec::new(Profile::GoldenEye);
        codec.set_input_buffer(&data);
        let compressed = codec.compress(CompressionType::Fixed).unwrap();
        assert!(compressed.len() < 100);

        codec.set_compressed_buffer(&compressed, Some(1000));
        assert_eq!(codec.decompress().unwrap(), [0x41; 1000]);
    }

    #[test]
    fn compress_best_picks_smallest() {
        let data = sample();
        let mut codec = Codec::new(Profile::BanjoKazooie);
        codec.set_input_buffer(&data);
        let (compression, best) = codec.compress_best().unwrap();
        assert_eq!(compression, CompressionType::Dynamic);
        for other in CompressionType::ALL {
            assert!(best.len() <= codec.compress(other).unwrap().len());
        }

        // Three literals and end of block take 34 bits with the fixed codes.
        codec.set_input_buffer(&[1, 2, 3]);
        let (compression, best) = codec.compress_best().unwrap();
        assert_eq!(compression, CompressionType::Fixed);
        assert_eq!(best.len(), 5);
    }

    #[test]
    fn nothing_bound() {
        let codec = Codec::new(Profile::GoldenEye);
        assert!(matches!(
            codec.compress(CompressionType::Stored),
            Err(CodecError::NoBufferBound)
        ));
        assert!(matches!(codec.decompress(), Err(CodecError::NoBufferBound)));
        assert!(matches!(codec.compress_best(), Err(CodecError::NoBufferBound)));
    }

    #[test]
    fn rebinding_replaces_buffer() {
        let data = b"rebinding".to_vec();
        let mut codec = Codec::new(Profile::GoldenEye);
        codec.set_input_buffer(&data);
        let compressed = codec.compress(CompressionType::Fixed).unwrap();

        codec.set_compressed_buffer(&compressed, None);
        assert!(matches!(
            codec.compress(CompressionType::Fixed),
            Err(CodecError::NoBufferBound)
        ));
        codec.set_input_buffer(&data);
        assert!(matches!(codec.decompress(), Err(CodecError::NoBufferBound)));
    }

    #[test]
    fn expected_length() {
        let data = vec![7u8; 500];
        let mut codec = Codec::new(Profile::GoldenEye);
        codec.set_input_buffer(&data);
        let compressed = codec.compress(CompressionType::Dynamic).unwrap();

        codec.set_compressed_buffer(&compressed, Some(501));
        assert!(matches!(
            codec.decompress(),
            Err(CodecError::SizeMismatch {
                expected: 501,
                actual: 500
            })
        ));

        codec.set_compressed_buffer(&compressed, Some(499));
        assert!(matches!(
            codec.decompress(),
            Err(CodecError::OutputOverflow { limit: 499 })
        ));
    }

    #[test]
    fn max_output() {
        let data = vec![0u8; 4096];
        let options = Options {
            max_output: 4095,
            ..Options::default()
        };
        let mut codec = Codec::with_options(Profile::GoldenEye, options);
        codec.set_input_buffer(&data);
        let compressed = codec.compress(CompressionType::Fixed).unwrap();

        codec.set_compressed_buffer(&compressed, None);
        assert!(matches!(
            codec.decompress(),
            Err(CodecError::OutputOverflow { limit: 4095 })
        ));
        codec.set_compressed_buffer(&compressed, Some(4096));
        assert_eq!(codec.decompress().unwrap(), data);
    }

    #[test]
    fn table_entry_ceiling() {
        let data = sample();
        let mut codec = Codec::new(Profile::GoldenEye);
        codec.set_input_buffer(&data);
        let compressed = codec.compress(CompressionType::Dynamic).unwrap();

        // Size of the literal/length trie of the first block.
        let mut cursor = BitCursor::new(&compressed);
        assert_eq!(cursor.consume(3).unwrap() >> 1, 2);
        let needed = huffman::build_dynamic(&mut cursor, DEFAULT_MAX_TABLE_ENTRIES)
            .unwrap()
            .litlen
            .len();

        let options = Options {
            max_table_entries: needed - 1,
            ..Options::default()
        };
        let mut limited = Codec::with_options(Profile::GoldenEye, options);
        limited.set_compressed_buffer(&compressed, Some(data.len()));
        match limited.decompress() {
            Err(CodecError::TableOverflow { limit }) => assert_eq!(limit, needed - 1),
            other => panic!("expected TableOverflow, got {:?}", other.map(|v| v.len())),
        }

        codec.set_compressed_buffer(&compressed, Some(data.len()));
        assert_eq!(codec.decompress().unwrap(), data);
    }

    #[test]
    fn oracle_decodes_our_output() {
        let data = sample();
        let mut codec = Codec::new(Profile::GoldenEye);
        codec.set_input_buffer(&data);
        for compression in CompressionType::ALL {
            let compressed = codec.compress(compression).unwrap();
            let decompressed = miniz_oxide::inflate::decompress_to_vec(&compressed).unwrap();
            assert_eq!(decompressed, data, "{:?}", compression);
        }
    }

    #[test]
    fn framed_roundtrip() {
        let data = sample();
        for profile in Profile::ALL {
            let mut codec = Codec::new(profile);
            codec.set_input_buffer(&data);
            let framed = codec.compress_framed(CompressionType::Dynamic).unwrap();
            assert_eq!(
                u16::from_be_bytes([framed[0], framed[1]]),
                profile.frame().magic()
            );

            codec.set_compressed_buffer(&framed, None);
            assert_eq!(codec.decompress_framed().unwrap(), data);
        }

        let mut codec = Codec::new(Profile::PerfectDark);
        codec.set_input_buffer(&data);
        let framed = codec.compress_framed(CompressionType::Fixed).unwrap();
        codec.set_profile(Profile::BanjoKazooie);
        codec.set_compressed_buffer(&framed, None);
        assert!(matches!(
            codec.decompress_framed(),
            Err(CodecError::BadMagic { .. })
        ));
    }
}
