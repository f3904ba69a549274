use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::FieldKind;

/// Fatal configuration problem found while installing a form or session.
///
/// A controller is never constructed while any of these are present.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("duplicate field name '{name}'")]
    DuplicateField { name: String },

    #[error("field at position {position} has an empty name")]
    EmptyFieldName { position: usize },

    #[error("choice field '{field}' declares no options")]
    MissingOptions { field: String },

    #[error("computed field '{field}' depends on undeclared field '{dependency}'")]
    UnknownDependency { field: String, dependency: String },

    #[error("computed field dependency cycle: {}", .path.join(" -> "))]
    DependencyCycle { path: Vec<String> },

    #[error("autosave is enabled but no form id is configured")]
    AutosaveWithoutFormId,

    /// A section or wizard step declared a form id or autosave; only the
    /// root form may.
    #[error("section '{section}' declares a form id or autosave")]
    NestedDraftSettings { section: String },

    #[error("session declares no steps")]
    NoSteps,

    #[error("invalid validator pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

/// Rejected write to the field store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("field '{0}' is computed and cannot be set directly")]
    ComputedField(String),

    #[error("field '{0}' does not accept NaN or infinite numbers")]
    NonFiniteNumber(String),

    #[error("field '{field}' of kind {kind} does not accept a {found} value")]
    KindMismatch {
        field: String,
        kind: FieldKind,
        found: &'static str,
    },
}

/// Failure of [`FormController::submit`](crate::FormController::submit).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// Validation failed; the submit function was not called.
    #[error("form is invalid ({errors} field errors)")]
    Invalid { errors: usize },

    /// The submit function itself failed.
    #[error("submission failed: {0}")]
    Rejected(String),
}

/// Failure reported by a [`DraftBackend`](crate::drafts::DraftBackend).
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("draft encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("corrupt draft: {0}")]
    Corruption(String),
}

/// Result type for draft backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error kind for configuration parse failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
}

/// Produced when configuration text cannot be deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
}
