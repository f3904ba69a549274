#![no_main]

use formstate::{FormConfig, SessionConfig, parse_json, parse_yaml};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let _ = parse_yaml::<FormConfig>(&s);
    let _ = parse_yaml::<SessionConfig>(&s);
    let _ = parse_json::<SessionConfig>(&s);
});
