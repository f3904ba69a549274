//! Conditional visibility.
//!
//! Pure functions of the current value map. Type mismatches never raise an
//! error: the clause simply does not hold.
//!
//! Coercion policy is strict. Values of different variants never compare
//! equal (`"42"` is not `42`), ordering operators need numbers on both sides,
//! and `contains` needs text on both sides.

use crate::enums::ConditionOperator;
use crate::types::{Condition, FieldDescriptor};
use crate::value::{FieldValue, ValueMap};

/// True when every condition holds (logical AND); true for an empty list.
pub fn is_visible(field: &FieldDescriptor, values: &ValueMap) -> bool {
    conditions_hold(&field.visible_when, values)
}

pub fn conditions_hold(conditions: &[Condition], values: &ValueMap) -> bool {
    conditions.iter().all(|c| condition_holds(c, values))
}

/// Evaluates one condition against the current value of its field.
///
/// A field absent from `values` is treated as null.
pub fn condition_holds(condition: &Condition, values: &ValueMap) -> bool {
    let current = values.get(&condition.field_name).unwrap_or(&FieldValue::Null);
    evaluate_operator(condition.operator, current, &condition.value)
}

/// Applies `operator` to a dependent value and the condition's operand.
pub fn evaluate_operator(
    operator: ConditionOperator,
    current: &FieldValue,
    operand: &FieldValue,
) -> bool {
    match operator {
        ConditionOperator::Equals => values_equal(current, operand),
        ConditionOperator::NotEquals => !values_equal(current, operand),
        ConditionOperator::Contains => match (current.as_text(), operand.as_text()) {
            (Some(haystack), Some(needle)) => haystack.contains(needle),
            _ => false,
        },
        ConditionOperator::GreaterThan => match (current.as_number(), operand.as_number()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionOperator::LessThan => match (current.as_number(), operand.as_number()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        ConditionOperator::IsEmpty => current.is_empty(),
        ConditionOperator::IsNotEmpty => !current.is_empty(),
    }
}

/// Exact equality without cross-variant coercion.
///
/// Null only equals null. Lists compare element-wise.
pub fn values_equal(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => true,
        (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
        (FieldValue::Number(a), FieldValue::Number(b)) => a == b,
        (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
        (FieldValue::Date(a), FieldValue::Date(b)) => a == b,
        (FieldValue::List(a), FieldValue::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        _ => false,
    }
}
