#![no_main]

use formstate::drafts::{decode_values, encode_values};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let Ok(values) = decode_values(&s) else {
        return;
    };

    // Anything we can decode must survive a write and a second read.
    let encoded = match encode_values(&values) {
        Ok(e) => e,
        Err(e) => panic!("decoded draft failed to encode: {e}\ninput: {:?}", s.get(..200)),
    };
    match decode_values(&encoded) {
        Ok(again) => assert_eq!(values, again, "draft changed across a round trip"),
        Err(e) => panic!("re-encoded draft failed to decode: {e}\nencoded: {encoded}"),
    }
});
