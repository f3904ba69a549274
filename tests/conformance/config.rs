use formstate::config::{DEFAULT_AUTOSAVE_DELAY_MS, DEFAULT_DEBOUNCE_MS};
use formstate::{FormConfig, ParseErrorKind, SessionConfig, ValidationMode, parse_json, parse_yaml};
use std::time::Duration;

#[test]
fn form_config_defaults() {
    let config: FormConfig = parse_yaml("validationMode: onNext\n").unwrap();
    assert_eq!(config, FormConfig::default());
    assert_eq!(config.debounce(), Duration::from_millis(DEFAULT_DEBOUNCE_MS));
    assert_eq!(
        config.autosave_delay(),
        Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS)
    );
}

#[test]
fn form_config_all_keys() {
    let yaml = r#"
validationMode: debounce
debounceMs: 150
autosaveDelayMs: 2500
"#;
    let config: FormConfig = parse_yaml(yaml).unwrap();
    assert_eq!(config.validation_mode, ValidationMode::Debounce);
    assert_eq!(config.debounce(), Duration::from_millis(150));
    assert_eq!(config.autosave_delay(), Duration::from_millis(2500));
}

#[test]
fn every_validation_mode_parses() {
    let cases = [
        ("onNext", ValidationMode::OnNext),
        ("onChange", ValidationMode::OnChange),
        ("debounce", ValidationMode::Debounce),
        ("onExit", ValidationMode::OnExit),
        ("manual", ValidationMode::Manual),
    ];
    for (name, expected) in cases {
        let config: FormConfig = parse_yaml(&format!("validationMode: {}\n", name)).unwrap();
        assert_eq!(config.validation_mode, expected, "mode {}", name);
    }
}

#[test]
fn session_config_from_yaml() {
    let yaml = r#"
formId: signup
validationMode: onExit
autosaveProgress: true
"#;
    let config: SessionConfig = parse_yaml(yaml).unwrap();
    assert_eq!(config.form_id.as_deref(), Some("signup"));
    assert!(config.autosave_progress);

    let form = config.form_config();
    assert_eq!(form.validation_mode, ValidationMode::OnExit);
    assert_eq!(form.debounce_ms, DEFAULT_DEBOUNCE_MS);
}

#[test]
fn session_config_from_json() {
    let config: SessionConfig =
        parse_json(r#"{"formId": "checkout", "debounceMs": 50}"#).unwrap();
    assert_eq!(config.form_id.as_deref(), Some("checkout"));
    assert_eq!(config.debounce_ms, 50);
    assert!(!config.autosave_progress);
}

#[test]
fn empty_input_is_a_syntax_error() {
    let err = parse_yaml::<FormConfig>("   \n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn malformed_json_is_a_syntax_error() {
    let err = parse_json::<FormConfig>("{\"validationMode\": ").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn non_mapping_root_is_rejected() {
    let err = parse_yaml::<FormConfig>("- onNext\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = parse_yaml::<FormConfig>("validationMode: manual\nretries: 3\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
    assert!(err.message.contains("retries"), "message: {}", err.message);
}

#[test]
fn unknown_mode_is_rejected() {
    let err = parse_yaml::<FormConfig>("validationMode: onBlur\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
}
