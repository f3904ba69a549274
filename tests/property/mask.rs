use formstate::mask::{apply_mask, is_complete};
use proptest::prelude::*;

/// Patterns without escapes, so every pattern char is one slot.
fn arb_pattern() -> impl Strategy<Value = String> {
    "[#A*()\\- ./]{1,14}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn masking_is_idempotent(pattern in arb_pattern(), input in "[a-zA-Z0-9()\\- ./]{0,24}") {
        let once = apply_mask(&pattern, &input);
        let twice = apply_mask(&pattern, &once);
        prop_assert_eq!(&twice, &once, "pattern {:?}, input {:?}", pattern, input);
    }

    #[test]
    fn output_never_exceeds_the_pattern(pattern in arb_pattern(), input in "[a-zA-Z0-9 ]{0,32}") {
        let out = apply_mask(&pattern, &input);
        let slots = pattern.chars().count();
        let written = out.chars().count();
        prop_assert!(written <= slots);
        if written == slots {
            prop_assert!(is_complete(&pattern, &out));
        }
    }

    #[test]
    fn ten_digits_fill_a_phone_mask(digits in "[0-9]{10}") {
        let out = apply_mask("(###) ###-####", &digits);
        prop_assert_eq!(
            out.clone(),
            format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..])
        );
        prop_assert!(is_complete("(###) ###-####", &out));
    }

    #[test]
    fn non_digits_are_dropped_from_digit_slots(noise in "[a-z ]{0,8}", digits in "[0-9]{4}") {
        let input: String = noise.chars().chain(digits.chars()).collect();
        prop_assert_eq!(apply_mask("####", &input), digits);
    }
}
