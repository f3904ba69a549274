#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use formstate::mask::{apply_mask, is_complete};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let (Ok(pattern), Ok(input)) = (String::arbitrary(&mut u), String::arbitrary(&mut u)) else {
        return;
    };

    let once = apply_mask(&pattern, &input);
    let twice = apply_mask(&pattern, &once);
    assert_eq!(
        once, twice,
        "mask not idempotent for pattern {:?}, input {:?}",
        pattern, input
    );
    let _ = is_complete(&pattern, &once);
});
