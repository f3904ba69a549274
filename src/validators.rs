//! Built-in validators.
//!
//! Every validator here passes on an empty value except [`required`], so
//! optional fields can carry format checks without becoming mandatory.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ConfigError;
use crate::types::Validator;
use crate::value::FieldValue;
use crate::visibility::values_equal;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Rejects null, whitespace-only text and empty lists.
pub fn required(message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new("required", move |value| {
        let missing = match value {
            FieldValue::Text(s) => s.trim().is_empty(),
            other => other.is_empty(),
        };
        missing.then(|| message.clone())
    })
}

/// Text must have at least `min` characters (lists: at least `min` items).
pub fn min_length(min: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new("min_length", move |value| {
        let len = length_of(value)?;
        (len < min).then(|| message.clone())
    })
}

/// Text must have at most `max` characters (lists: at most `max` items).
pub fn max_length(max: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new("max_length", move |value| {
        let len = length_of(value)?;
        (len > max).then(|| message.clone())
    })
}

/// Text must match `pattern` (unanchored, as written).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidPattern`] if `pattern` does not compile.
pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Validator, ConfigError> {
    let re = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;
    let message = message.into();
    Ok(Validator::new("pattern", move |value| match value.as_text() {
        Some(s) if !s.is_empty() => (!re.is_match(s)).then(|| message.clone()),
        _ => None,
    }))
}

pub fn email(message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new("email", move |value| match value.as_text() {
        Some(s) if !s.is_empty() => (!EMAIL_RE.is_match(s.trim())).then(|| message.clone()),
        _ => None,
    })
}

/// Numbers must be `>= min`. Non-numeric values are left to other validators.
pub fn min_value(min: f64, message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new("min_value", move |value| {
        let n = value.as_number()?;
        (n < min).then(|| message.clone())
    })
}

/// Numbers must be `<= max`.
pub fn max_value(max: f64, message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new("max_value", move |value| {
        let n = value.as_number()?;
        (n > max).then(|| message.clone())
    })
}

/// Value (or every list element) must be one of `allowed`.
pub fn one_of(allowed: Vec<FieldValue>, message: impl Into<String>) -> Validator {
    let message = message.into();
    Validator::new("one_of", move |value| {
        let permitted = |v: &FieldValue| allowed.iter().any(|a| values_equal(a, v));
        let ok = match value {
            FieldValue::Null => true,
            FieldValue::List(items) => items.iter().all(permitted),
            other => permitted(other),
        };
        (!ok).then(|| message.clone())
    })
}

fn length_of(value: &FieldValue) -> Option<usize> {
    match value {
        FieldValue::Text(s) if !s.is_empty() => Some(s.chars().count()),
        FieldValue::List(items) if !items.is_empty() => Some(items.len()),
        _ => None,
    }
}
