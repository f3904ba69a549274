//! Closed enumerations used throughout the form model.
//!
//! All of these are "closed": only the listed variants exist, and the serde
//! names are the camelCase spellings used in configuration files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of a field. Decides which [`FieldValue`](crate::FieldValue)
/// variants the field accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Text,
    Number,
    Choice,
    Date,
    Boolean,
    Custom,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Choice => "choice",
            FieldKind::Date => "date",
            FieldKind::Boolean => "boolean",
            FieldKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Operator of a visibility [`Condition`](crate::Condition).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

/// Lifecycle state of a form controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormState {
    #[default]
    Pristine,
    Dirty,
    Submitting,
    Submitted,
    Failed,
}

/// When validators run automatically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    /// Validate the current step only when an advance is requested.
    #[default]
    OnNext,
    /// Validate touched fields right after every update.
    OnChange,
    /// Like `OnChange`, but coalesced behind a quiet window.
    Debounce,
    /// Validate the step being left before any navigation away from it.
    OnExit,
    /// Only explicit `validate` calls run validators.
    Manual,
}

/// Outcome of a wizard navigation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    /// The session moved to the given step index.
    Moved(usize),
    /// The last step was accepted and the session is complete.
    Completed,
    /// The step being left failed validation.
    BlockedByValidation,
    /// The caller-supplied guard refused the advance.
    BlockedByGuard,
    /// The requested target is not reachable from the current step.
    Refused,
}
