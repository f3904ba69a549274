//! Install-time configuration checks.
//!
//! Returns **all** problems found, not just the first. Checks never modify
//! the descriptor. The dependency graph performs its own cycle and
//! unknown-source checks when built; [`check_form`] builds it once the names
//! are well-formed so a single call reports everything.

use std::collections::HashSet;

use crate::config::SessionConfig;
use crate::enums::FieldKind;
use crate::error::ConfigError;
use crate::graph::DependencyGraph;
use crate::types::{FieldDescriptor, FormBody, FormDescriptor};

/// Check a form descriptor, returning every configuration error found.
pub fn check_form(form: &FormDescriptor) -> Vec<ConfigError> {
    checked_graph(form).err().unwrap_or_default()
}

/// Runs every check and, when they pass, returns the dependency graph built
/// along the way.
pub(crate) fn checked_graph(form: &FormDescriptor) -> Result<DependencyGraph, Vec<ConfigError>> {
    let fields = form.fields();
    let mut errors = Vec::new();

    field_names_present(&fields, &mut errors);
    field_names_unique(&fields, &mut errors);
    choices_have_options(&fields, &mut errors);
    autosave_has_form_id(form, &mut errors);
    draft_settings_only_at_root(form, &mut errors);
    warn_unresolved_conditions(&fields);

    // Cycle detection needs a well-formed name set to give a useful path.
    if !errors.is_empty() {
        return Err(errors);
    }
    DependencyGraph::build(&fields)
}

/// Check the session-level settings of a wizard.
pub fn check_session(steps: &[FormDescriptor], config: &SessionConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();
    if steps.is_empty() {
        errors.push(ConfigError::NoSteps);
    }
    if config.autosave_progress && config.form_id.is_none() {
        errors.push(ConfigError::AutosaveWithoutFormId);
    }
    errors
}

fn field_names_present(fields: &[&FieldDescriptor], errors: &mut Vec<ConfigError>) {
    for (position, field) in fields.iter().enumerate() {
        if field.name.trim().is_empty() {
            errors.push(ConfigError::EmptyFieldName { position });
        }
    }
}

fn field_names_unique(fields: &[&FieldDescriptor], errors: &mut Vec<ConfigError>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) && reported.insert(field.name.as_str()) {
            errors.push(ConfigError::DuplicateField {
                name: field.name.clone(),
            });
        }
    }
}

fn choices_have_options(fields: &[&FieldDescriptor], errors: &mut Vec<ConfigError>) {
    for field in fields {
        if field.kind == FieldKind::Choice && field.options.is_empty() {
            errors.push(ConfigError::MissingOptions {
                field: field.name.clone(),
            });
        }
    }
}

fn autosave_has_form_id(form: &FormDescriptor, errors: &mut Vec<ConfigError>) {
    if form.autosave && form.form_id.is_none() {
        errors.push(ConfigError::AutosaveWithoutFormId);
    }
}

/// Drafts belong to the whole form; sections cannot carry their own.
fn draft_settings_only_at_root(form: &FormDescriptor, errors: &mut Vec<ConfigError>) {
    if let FormBody::Sections(sections) = &form.body {
        for (index, section) in sections.iter().enumerate() {
            nested_draft_settings(section, index.to_string(), errors);
        }
    }
}

fn nested_draft_settings(section: &FormDescriptor, path: String, errors: &mut Vec<ConfigError>) {
    if section.form_id.is_some() || section.autosave {
        errors.push(ConfigError::NestedDraftSettings {
            section: section.title.clone().unwrap_or_else(|| path.clone()),
        });
    }
    if let FormBody::Sections(children) = &section.body {
        for (index, child) in children.iter().enumerate() {
            nested_draft_settings(child, format!("{path}.{index}"), errors);
        }
    }
}

/// Conditions may reference fields of another form; they read as null here.
fn warn_unresolved_conditions(fields: &[&FieldDescriptor]) {
    let declared: HashSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    for field in fields {
        for condition in &field.visible_when {
            if !declared.contains(condition.field_name.as_str()) {
                tracing::warn!(
                    field = %field.name,
                    references = %condition.field_name,
                    "visibility condition references an undeclared field"
                );
            }
        }
    }
}
