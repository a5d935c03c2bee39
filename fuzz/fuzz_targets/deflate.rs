#![no_main]
use gecompress::{CompressionType, Compressor, Profile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (level, data) = input;
    for compression in [CompressionType::Fixed, CompressionType::Dynamic] {
        let compressed = Compressor::new(Profile::GoldenEye, compression, level % 10)
            .compress_to_vec(&data)
            .unwrap();

        let decompressed = gecompress::decompress_to_vec(&compressed, Profile::GoldenEye, data.len())
            .expect("Decompression failed!");
        assert_eq!(decompressed, data);

        let decompressed = miniz_oxide::inflate::decompress_to_vec(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }
});
