#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(Some(converted)) = derval::indef::convert(data) {
        // Converted data must convert to itself.
        assert_eq!(
            derval::indef::convert(&converted).unwrap().unwrap(),
            converted
        );
    }
});
