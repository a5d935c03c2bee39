#![no_main]
use gecompress::{compress_to_vec, CompressionType, Profile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<Vec<u8>>| {
    let data = data.concat();
    let compressed = compress_to_vec(&data, Profile::BanjoKazooie, CompressionType::Stored).unwrap();

    let decompressed = miniz_oxide::inflate::decompress_to_vec(&compressed).unwrap();
    assert_eq!(decompressed, data);

    let blocks = ((data.len() + 65534) / 65535).max(1);
    assert_eq!(compressed.len(), data.len() + 5 * blocks);
});
