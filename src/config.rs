//! Engine configuration and its loaders.
//!
//! Configuration is declared once and validated at install time; it is never
//! re-read per update. Both structures deserialize from YAML or JSON with
//! every key optional:
//!
//! ```yaml
//! validationMode: debounce
//! debounceMs: 300
//! autosaveDelayMs: 1000
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::enums::ValidationMode;
use crate::error::{ParseError, ParseErrorKind};

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

/// Settings of a single form controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormConfig {
    #[serde(default)]
    pub validation_mode: ValidationMode,
    /// Quiet window of the `debounce` validation mode.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Quiet window before a scheduled draft write is flushed.
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::default(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

impl FormConfig {
    pub fn with_mode(validation_mode: ValidationMode) -> Self {
        Self {
            validation_mode,
            ..Self::default()
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

/// Settings of a wizard session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub validation_mode: ValidationMode,
    /// Persist a draft after every successful step transition.
    #[serde(default)]
    pub autosave_progress: bool,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            form_id: None,
            validation_mode: ValidationMode::default(),
            autosave_progress: false,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
        }
    }
}

impl SessionConfig {
    /// Per-form settings applied to the session's shared controller.
    pub fn form_config(&self) -> FormConfig {
        FormConfig {
            validation_mode: self.validation_mode,
            debounce_ms: self.debounce_ms,
            autosave_delay_ms: self.autosave_delay_ms,
        }
    }
}

/// Parse a YAML configuration document.
///
/// Deserialization only; install-time checks happen when the controller or
/// session is built.
pub fn parse_yaml<T: for<'de> Deserialize<'de>>(input: &str) -> Result<T, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError {
            kind: ParseErrorKind::Syntax,
            message: "empty input".to_string(),
        });
    }

    // YAML goes through a JSON value first so both loaders share one set of
    // type errors.
    let value: serde_json::Value = serde_saphyr::from_str(input).map_err(|e| ParseError {
        kind: ParseErrorKind::Syntax,
        message: e.to_string(),
    })?;
    from_value(value)
}

/// Parse a JSON configuration document.
pub fn parse_json<T: for<'de> Deserialize<'de>>(input: &str) -> Result<T, ParseError> {
    let value: serde_json::Value = serde_json::from_str(input).map_err(|e| ParseError {
        kind: ParseErrorKind::Syntax,
        message: e.to_string(),
    })?;
    from_value(value)
}

fn from_value<T: for<'de> Deserialize<'de>>(value: serde_json::Value) -> Result<T, ParseError> {
    if !value.is_object() {
        return Err(ParseError {
            kind: ParseErrorKind::TypeMismatch,
            message: "configuration root must be a mapping".to_string(),
        });
    }
    serde_json::from_value(value).map_err(|e| ParseError {
        kind: ParseErrorKind::TypeMismatch,
        message: e.to_string(),
    })
}
