use formstate::visibility::{condition_holds, values_equal};
use formstate::{Condition, FieldValue, ValueMap};
use proptest::prelude::*;

fn arb_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        Just(FieldValue::Null),
        "[a-z0-9 ]{0,12}".prop_map(FieldValue::from),
        (-1.0e6..1.0e6f64).prop_map(FieldValue::Number),
        any::<bool>().prop_map(FieldValue::Bool),
    ]
}

fn with(value: FieldValue) -> ValueMap {
    let mut values = ValueMap::new();
    values.insert("x".to_string(), value);
    values
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn equals_is_reflexive(value in arb_value()) {
        let values = with(value.clone());
        prop_assert!(condition_holds(&Condition::equals("x", value), &values));
    }

    #[test]
    fn not_equals_is_the_complement_of_equals(current in arb_value(), operand in arb_value()) {
        let values = with(current);
        let eq = condition_holds(&Condition::equals("x", operand.clone()), &values);
        let ne = condition_holds(&Condition::not_equals("x", operand), &values);
        prop_assert_ne!(eq, ne);
    }

    #[test]
    fn equality_is_symmetric(a in arb_value(), b in arb_value()) {
        prop_assert_eq!(values_equal(&a, &b), values_equal(&b, &a));
    }

    // contains(x, needle) == haystack.contains(needle)
    #[test]
    fn contains_matches_std(
        haystack in "[a-zA-Z0-9 ]{0,40}",
        needle in "[a-zA-Z0-9]{0,6}",
    ) {
        let values = with(FieldValue::from(haystack.clone()));
        let result = condition_holds(&Condition::contains("x", needle.clone()), &values);
        prop_assert_eq!(result, haystack.contains(&needle),
            "contains({:?}, {:?})", haystack, needle);
    }

    #[test]
    fn ordering_matches_f64(a in -1.0e6..1.0e6f64, b in -1.0e6..1.0e6f64) {
        let values = with(FieldValue::Number(a));
        prop_assert_eq!(condition_holds(&Condition::greater_than("x", b), &values), a > b);
        prop_assert_eq!(condition_holds(&Condition::less_than("x", b), &values), a < b);
    }

    // Strict coercion: "42" is never 42.
    #[test]
    fn text_never_compares_with_numbers(n in -1000i64..1000) {
        let values = with(FieldValue::from(n.to_string()));
        prop_assert!(!condition_holds(&Condition::equals("x", n), &values));
        prop_assert!(!condition_holds(&Condition::greater_than("x", n - 1), &values));
        prop_assert!(!condition_holds(&Condition::less_than("x", n + 1), &values));
    }

    #[test]
    fn absent_field_behaves_as_null(operand in arb_value()) {
        let absent = ValueMap::new();
        let null = with(FieldValue::Null);
        for condition in [
            Condition::equals("x", operand.clone()),
            Condition::not_equals("x", operand.clone()),
            Condition::is_empty("x"),
            Condition::is_not_empty("x"),
        ] {
            prop_assert_eq!(condition_holds(&condition, &absent), condition_holds(&condition, &null));
        }
    }

    #[test]
    fn emptiness_is_exclusive(value in arb_value()) {
        let values = with(value);
        let empty = condition_holds(&Condition::is_empty("x"), &values);
        let not_empty = condition_holds(&Condition::is_not_empty("x"), &values);
        prop_assert_ne!(empty, not_empty);
    }
}
