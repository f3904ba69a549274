use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::enums::*;
use crate::value::{FieldValue, ValueMap};

// ─── Validator ──────────────────────────────────────────────────────────────

type ValidateFn = dyn Fn(&FieldValue) -> Option<String> + Send + Sync;

/// A named, pure check over a candidate value.
///
/// Returns `None` when the value is accepted, or the error message.
#[derive(Clone)]
pub struct Validator {
    name: String,
    check: Arc<ValidateFn>,
}

impl Validator {
    pub fn new(
        name: impl Into<String>,
        check: impl Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check(&self, value: &FieldValue) -> Option<String> {
        (self.check)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.name).finish()
    }
}

// ─── Computed ───────────────────────────────────────────────────────────────

type ComputeFn = dyn Fn(&ValueMap) -> FieldValue + Send + Sync;

/// Derivation of a computed field: its declared sources and the function
/// producing its value from the full value map.
///
/// The function must only read the fields listed in `sources`.
#[derive(Clone)]
pub struct Computed {
    sources: Vec<String>,
    compute: Arc<ComputeFn>,
}

impl Computed {
    pub fn new<I, S>(
        sources: I,
        compute: impl Fn(&ValueMap) -> FieldValue + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut deduped: Vec<String> = Vec::new();
        for source in sources {
            let source = source.into();
            if !deduped.contains(&source) {
                deduped.push(source);
            }
        }
        Self {
            sources: deduped,
            compute: Arc::new(compute),
        }
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn compute(&self, values: &ValueMap) -> FieldValue {
        (self.compute)(values)
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

// ─── Condition ──────────────────────────────────────────────────────────────

/// A visibility predicate over another field's current value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_name: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: FieldValue,
}

impl Condition {
    pub fn new(
        field_name: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<FieldValue>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field_name, ConditionOperator::Equals, value)
    }

    pub fn not_equals(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field_name, ConditionOperator::NotEquals, value)
    }

    pub fn contains(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field_name, ConditionOperator::Contains, value)
    }

    pub fn greater_than(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field_name, ConditionOperator::GreaterThan, value)
    }

    pub fn less_than(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field_name, ConditionOperator::LessThan, value)
    }

    pub fn is_empty(field_name: impl Into<String>) -> Self {
        Self::new(field_name, ConditionOperator::IsEmpty, FieldValue::Null)
    }

    pub fn is_not_empty(field_name: impl Into<String>) -> Self {
        Self::new(field_name, ConditionOperator::IsNotEmpty, FieldValue::Null)
    }
}

// ─── ChoiceOption ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub label: String,
    pub value: FieldValue,
}

impl ChoiceOption {
    pub fn new(label: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

// ─── FieldDescriptor ────────────────────────────────────────────────────────

/// Declarative description of one field.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub label: String,
    pub help: Option<String>,
    pub default_value: FieldValue,
    pub validators: Vec<Validator>,
    pub options: Vec<ChoiceOption>,
    pub computed: Option<Computed>,
    pub visible_when: Vec<Condition>,
    pub mask: Option<String>,
}

impl FieldDescriptor {
    /// Create a field with the label defaulting to its name.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            help: None,
            default_value: FieldValue::Null,
            validators: Vec::new(),
            options: Vec::new(),
            computed: None,
            visible_when: Vec::new(),
            mask: None,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn choice(name: impl Into<String>, options: Vec<ChoiceOption>) -> Self {
        Self::new(name, FieldKind::Choice).options(options)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Custom)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn options(mut self, options: Vec<ChoiceOption>) -> Self {
        self.options = options;
        self
    }

    pub fn computed(mut self, computed: Computed) -> Self {
        self.computed = Some(computed);
        self
    }

    pub fn visible_when(mut self, condition: Condition) -> Self {
        self.visible_when.push(condition);
        self
    }

    pub fn mask(mut self, pattern: impl Into<String>) -> Self {
        self.mask = Some(pattern.into());
        self
    }

    pub fn is_computed(&self) -> bool {
        self.computed.is_some()
    }

    /// Whether this field's kind admits `value`. Null is always admitted.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match (self.kind, value) {
            (_, FieldValue::Null) => true,
            (FieldKind::Custom, _) => true,
            (FieldKind::Text, FieldValue::Text(_)) => true,
            (FieldKind::Number, FieldValue::Number(_)) => true,
            (FieldKind::Date, FieldValue::Date(_)) => true,
            (FieldKind::Boolean, FieldValue::Bool(_)) => true,
            // Multi-select choices hold a list of option values.
            (FieldKind::Choice, _) => true,
            _ => false,
        }
    }
}

// ─── FormDescriptor ─────────────────────────────────────────────────────────

/// Content of a form node: direct fields or nested sections, never both.
#[derive(Clone, Debug)]
pub enum FormBody {
    Fields(Vec<FieldDescriptor>),
    Sections(Vec<FormDescriptor>),
}

/// Declarative description of a form or one of its sections.
#[derive(Clone, Debug)]
pub struct FormDescriptor {
    pub form_id: Option<String>,
    pub title: Option<String>,
    pub autosave: bool,
    pub body: FormBody,
}

impl FormDescriptor {
    pub fn with_fields(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            form_id: None,
            title: None,
            autosave: false,
            body: FormBody::Fields(fields),
        }
    }

    pub fn with_sections(sections: Vec<FormDescriptor>) -> Self {
        Self {
            form_id: None,
            title: None,
            autosave: false,
            body: FormBody::Sections(sections),
        }
    }

    pub fn form_id(mut self, id: impl Into<String>) -> Self {
        self.form_id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn autosave(mut self, enabled: bool) -> Self {
        self.autosave = enabled;
        self
    }

    /// All fields of the tree, depth-first in declaration order.
    pub fn fields(&self) -> Vec<&FieldDescriptor> {
        let mut out = Vec::new();
        collect_fields(self, &mut out);
        out
    }

    /// Names of all fields in the tree, in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.fields().into_iter().map(|f| f.name.clone()).collect()
    }
}

fn collect_fields<'a>(form: &'a FormDescriptor, out: &mut Vec<&'a FieldDescriptor>) {
    match &form.body {
        FormBody::Fields(fields) => out.extend(fields.iter()),
        FormBody::Sections(sections) => {
            for section in sections {
                collect_fields(section, out);
            }
        }
    }
}
