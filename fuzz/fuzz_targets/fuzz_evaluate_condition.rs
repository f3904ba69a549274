#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use formstate::visibility::{condition_holds, evaluate_operator};
use formstate::{Condition, ConditionOperator, FieldValue, ValueMap};
use libfuzzer_sys::fuzz_target;

fn arbitrary_operator(u: &mut Unstructured<'_>) -> arbitrary::Result<ConditionOperator> {
    Ok(match u.int_in_range(0..=6)? {
        0 => ConditionOperator::Equals,
        1 => ConditionOperator::NotEquals,
        2 => ConditionOperator::Contains,
        3 => ConditionOperator::GreaterThan,
        4 => ConditionOperator::LessThan,
        5 => ConditionOperator::IsEmpty,
        _ => ConditionOperator::IsNotEmpty,
    })
}

/// Generate a field value, nesting lists at most `depth` levels.
fn arbitrary_value(u: &mut Unstructured<'_>, depth: u8) -> arbitrary::Result<FieldValue> {
    match u.int_in_range(0..=4)? {
        0 => Ok(FieldValue::Null),
        1 => Ok(FieldValue::Bool(bool::arbitrary(u)?)),
        2 => Ok(FieldValue::Number(f64::arbitrary(u)?)),
        3 => Ok(FieldValue::Text(String::arbitrary(u)?)),
        _ if depth > 0 => {
            let len = u.int_in_range(0..=4)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(arbitrary_value(u, depth - 1)?);
            }
            Ok(FieldValue::List(items))
        }
        _ => Ok(FieldValue::Null),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);

    let Ok(operator) = arbitrary_operator(&mut u) else {
        return;
    };
    let Ok(current) = arbitrary_value(&mut u, 2) else {
        return;
    };
    let Ok(operand) = arbitrary_value(&mut u, 2) else {
        return;
    };

    let direct = evaluate_operator(operator, &current, &operand);

    let mut values = ValueMap::new();
    values.insert("field".to_string(), current);
    let condition = Condition::new("field", operator, operand);
    assert_eq!(direct, condition_holds(&condition, &values));
});
