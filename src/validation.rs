//! Field validation and the per-controller error cache.
//!
//! A field's validators run in declaration order and stop at the first
//! failure. Hidden fields are skipped entirely: they are never validated, and
//! a cached error is dropped as soon as a pass finds its field hidden.

use indexmap::IndexMap;

use crate::types::FieldDescriptor;
use crate::value::{FieldValue, ValueMap};
use crate::visibility::is_visible;

/// Runs `field`'s validators against `value`, returning the first message.
pub fn validate_field(field: &FieldDescriptor, value: &FieldValue) -> Option<String> {
    field.validators.iter().find_map(|v| v.check(value))
}

/// Outcome of one validation pass: field name → message, for the fields of
/// that pass which failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: IndexMap<String, String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Validates every visible field of `fields` without touching any cache.
pub fn validate_all<'a, I>(fields: I, values: &ValueMap) -> ValidationReport
where
    I: IntoIterator<Item = &'a FieldDescriptor>,
{
    let mut report = ValidationReport::default();
    for field in fields {
        if !is_visible(field, values) {
            continue;
        }
        let value = values.get(&field.name).unwrap_or(&FieldValue::Null);
        if let Some(message) = validate_field(field, value) {
            report.errors.insert(field.name.clone(), message);
        }
    }
    report
}

/// Last known message per field, updated by each validation pass.
#[derive(Clone, Debug, Default)]
pub struct ValidationEngine {
    errors: IndexMap<String, String>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `fields` and records the outcome for each of them.
    ///
    /// Fields outside the pass keep their cached result.
    pub fn run<'a, I>(&mut self, fields: I, values: &ValueMap) -> ValidationReport
    where
        I: IntoIterator<Item = &'a FieldDescriptor>,
    {
        let mut report = ValidationReport::default();
        for field in fields {
            if !is_visible(field, values) {
                self.errors.shift_remove(&field.name);
                continue;
            }
            let value = values.get(&field.name).unwrap_or(&FieldValue::Null);
            match validate_field(field, value) {
                Some(message) => {
                    tracing::debug!(field = %field.name, error = %message, "validation failed");
                    self.errors.insert(field.name.clone(), message.clone());
                    report.errors.insert(field.name.clone(), message);
                }
                None => {
                    self.errors.shift_remove(&field.name);
                }
            }
        }
        report
    }

    /// Cached message for `field`, regardless of its current visibility.
    pub fn cached(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

