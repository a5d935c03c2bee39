//! Scanning arbitrary bytes for assets never panics, and every asset found decodes the same
//! way through the framed codec path.

#![no_main]
use gecompress::{scan_assets, Codec, Options, Profile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, &[u8])| {
    let Ok(profile) = Profile::try_from(input.0 % 3) else { return };
    let rom = input.1;

    for asset in scan_assets(rom, profile, &Options::default()) {
        let mut codec = Codec::new(profile);
        codec.set_compressed_buffer(&rom[asset.offset..], None);
        assert_eq!(codec.decompress_framed().unwrap(), asset.data);
    }
});
