#![no_main]
use gecompress::{CodecError, Profile};
use libfuzzer_sys::fuzz_target;
use miniz_oxide::inflate::TINFLStatus;

const LIMIT: usize = 1 << 26;

fuzz_target!(|input: &[u8]| {
    if input.is_empty() {
        return;
    }

    match gecompress::decompress_to_vec(input, Profile::GoldenEye, LIMIT) {
        Ok(decompressed) => {
            let Ok(decompressed2) = miniz_oxide::inflate::decompress_to_vec(input) else { return };
            assert_eq!(decompressed, decompressed2);
        }
        // Stricter than miniz_oxide about incomplete codes and reserved symbols.
        Err(CodecError::MalformedTable(_)) => {}
        Err(CodecError::InvalidSymbol) => {}
        Err(CodecError::OutputOverflow { .. }) => {}
        Err(err) => match miniz_oxide::inflate::decompress_to_vec(input) {
            Err(r)
                if r.status == TINFLStatus::Failed
                    || r.status == TINFLStatus::FailedCannotMakeProgress => {}
            r => {
                panic!("gecompress: {:?}, miniz_oxide: {:?}", err, r);
            }
        },
    }
});
