#![no_main]

use libfuzzer_sys::fuzz_target;
use derval::{Mode, TaggedValue, ValueDecoder};

fuzz_target!(|data: &[u8]| {
    for mode in [Mode::Ber, Mode::Der] {
        if let Ok(mut value) = TaggedValue::decode(
            bytes::Bytes::copy_from_slice(data), mode
        ) {
            let _ = value.to_vec();
            let _ = value.clone().to_bool();
            let _ = value.clone().to_i32();
            let _ = value.clone().to_integer();
            let _ = value.clone().to_unsigned();
            let _ = value.clone().to_enumerated();
            let _ = value.clone().to_oid();
            let _ = value.clone().to_octet_string();
            let _ = value.clone().to_bit_string();
            let _ = value.clone().to_bit_array();
            let _ = value.clone().to_utc_time();
            let _ = value.clone().to_generalized_time();
            let _ = value.to_text();
        }

        let mut decoder = ValueDecoder::new(
            bytes::Bytes::copy_from_slice(data), mode
        );
        while decoder.skip_value().is_ok() { }
    }
});
