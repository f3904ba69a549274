use formstate::types::Condition;
use formstate::value::ValueMap;
use formstate::visibility::conditions_hold;

use super::common::load_cases;

#[derive(Debug, serde::Deserialize)]
struct ConditionCase {
    id: String,
    name: String,
    conditions: Vec<Condition>,
    values: ValueMap,
    expected: bool,
}

#[test]
fn condition_suite() {
    let cases: Vec<ConditionCase> = load_cases("conditions.yaml");
    assert!(!cases.is_empty(), "fixture has no cases");

    let mut passed = 0;
    let mut failed = 0;

    for case in &cases {
        let result = conditions_hold(&case.conditions, &case.values);
        if result == case.expected {
            passed += 1;
        } else {
            eprintln!(
                "  FAIL [{}] {}: expected {}, got {}",
                case.id, case.name, case.expected, result
            );
            failed += 1;
        }
    }

    eprintln!(
        "\nconditions: {} passed, {} failed out of {} total",
        passed,
        failed,
        cases.len()
    );
    assert_eq!(failed, 0, "{} condition tests failed", failed);
}

#[test]
fn operators_use_camel_case_names() {
    let condition: Condition = serde_json::from_str(
        r#"{"fieldName": "age", "operator": "greaterThan", "value": 17}"#,
    )
    .unwrap();
    assert_eq!(condition, Condition::greater_than("age", 17));

    let encoded = serde_json::to_value(Condition::is_not_empty("notes")).unwrap();
    assert_eq!(encoded["operator"], "isNotEmpty");
    assert_eq!(encoded["fieldName"], "notes");
}

#[test]
fn unknown_operator_is_rejected() {
    let result: Result<Condition, _> =
        serde_json::from_str(r#"{"fieldName": "age", "operator": "matches", "value": 1}"#);
    assert!(result.is_err());
}
