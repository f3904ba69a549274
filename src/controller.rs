//! The form controller: one instance owns the value store, the dependency
//! graph, the validation cache, listeners, timers and submission state.
//!
//! An update flows through the controller synchronously:
//!
//! ```text
//! set ─► mask / kind check ─► store ─► propagate computed fields
//!     ─► validation (per mode) ─► field listeners ─► form listeners
//!     ─► state listeners ─► schedule autosave
//! ```
//!
//! Everything reaches a fixpoint before `set` returns. The only deferred work
//! is the debounced validation pass and the autosave write, both of which
//! are passive deadlines the host drives with [`FormController::tick`].

use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::check::checked_graph;
use crate::config::FormConfig;
use crate::debounce::Debouncer;
use crate::drafts::DraftStore;
use crate::enums::{FormState, ValidationMode};
use crate::error::{ConfigError, FieldError, SubmissionError};
use crate::graph::DependencyGraph;
use crate::listeners::ListenerRegistry;
use crate::mask::apply_mask;
use crate::types::{FieldDescriptor, FormDescriptor};
use crate::validation::{ValidationEngine, ValidationReport, validate_all};
use crate::value::{FieldValue, ValueMap};
use crate::visibility::is_visible;

pub struct FormController {
    descriptor: Arc<FormDescriptor>,
    config: FormConfig,
    fields: IndexMap<String, FieldDescriptor>,
    graph: DependencyGraph,
    values: ValueMap,
    initial: ValueMap,
    state: FormState,
    validation: ValidationEngine,
    listeners: ListenerRegistry,
    /// Fields touched since the last debounced validation pass.
    pending_validation: Debouncer<IndexSet<String>>,
    /// Snapshot awaiting its autosave write.
    autosave: Debouncer<ValueMap>,
    form_id: Option<String>,
    drafts: Option<DraftStore>,
    submit_error: Option<String>,
}

impl FormController {
    /// Installs a form.
    ///
    /// Every field is seeded with its declared default; the same snapshot
    /// becomes the target of [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// Returns every configuration problem found. No controller exists
    /// until the descriptor is corrected.
    pub fn new(descriptor: FormDescriptor, config: FormConfig) -> Result<Self, Vec<ConfigError>> {
        Self::from_shared(Arc::new(descriptor), config)
    }

    /// Installs a form from a descriptor shared with other controllers.
    pub fn from_shared(
        descriptor: Arc<FormDescriptor>,
        config: FormConfig,
    ) -> Result<Self, Vec<ConfigError>> {
        let graph = checked_graph(&descriptor).inspect_err(|errors| {
            tracing::warn!(errors = errors.len(), "form configuration rejected");
        })?;

        let declared = descriptor.fields();
        let fields: IndexMap<String, FieldDescriptor> = declared
            .iter()
            .map(|f| (f.name.clone(), (*f).clone()))
            .collect();
        let values: ValueMap = fields
            .values()
            .map(|f| (f.name.clone(), f.default_value.clone()))
            .collect();

        tracing::info!(
            form_id = ?descriptor.form_id,
            fields = fields.len(),
            computed = graph.order().len(),
            mode = ?config.validation_mode,
            "form installed"
        );

        Ok(Self {
            form_id: descriptor.form_id.clone(),
            pending_validation: Debouncer::new(config.debounce()),
            autosave: Debouncer::new(config.autosave_delay()),
            descriptor,
            config,
            fields,
            graph,
            initial: values.clone(),
            values,
            state: FormState::Pristine,
            validation: ValidationEngine::new(),
            listeners: ListenerRegistry::new(),
            drafts: None,
            submit_error: None,
        })
    }

    /// Attaches the draft store used by autosave and the draft operations.
    pub fn with_draft_store(mut self, store: DraftStore) -> Self {
        self.drafts = Some(store);
        self
    }

    pub fn set_draft_store(&mut self, store: DraftStore) {
        self.drafts = Some(store);
    }

    /// Replaces the configuration, wiping all prior state.
    ///
    /// Pending timers are dropped. Listeners and the draft store stay
    /// attached. On error the current configuration remains in force.
    pub fn set_config(
        &mut self,
        descriptor: FormDescriptor,
        config: FormConfig,
    ) -> Result<(), Vec<ConfigError>> {
        let mut fresh = Self::new(descriptor, config)?;
        if self.autosave.is_pending() {
            tracing::debug!("pending autosave dropped by reconfiguration");
        }
        fresh.listeners = self.listeners.clone();
        fresh.drafts = self.drafts.take();
        *self = fresh;
        Ok(())
    }

    pub fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn form_id(&self) -> Option<&str> {
        self.form_id.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Subscription handle; clones share the same subscriber lists.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn form_state(&self) -> FormState {
        self.state
    }

    /// Message recorded by the last failed submission.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    // ─── Values ─────────────────────────────────────────────────────────────

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Copy of the whole value map, in declaration order.
    pub fn get_all(&self) -> ValueMap {
        self.values.clone()
    }

    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Sets one input field. Returns whether the stored value changed.
    ///
    /// # Errors
    ///
    /// Fails for unknown fields, computed fields and values the field's
    /// kind does not accept. Nothing is modified on failure.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<bool, FieldError> {
        self.set_at(name, value, Instant::now())
    }

    /// [`set`](Self::set) with an explicit timestamp for the debounce and
    /// autosave windows.
    pub fn set_at(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
        now: Instant,
    ) -> Result<bool, FieldError> {
        let entry = self.prepare(name.to_string(), value.into())?;
        Ok(self.apply_batch(vec![entry], now))
    }

    /// Sets several input fields as one update: one propagation pass, one
    /// form-change notification. All entries are checked before any is
    /// applied.
    pub fn set_many<I, K, V>(&mut self, entries: I) -> Result<bool, FieldError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.set_many_at(entries, Instant::now())
    }

    pub fn set_many_at<I, K, V>(&mut self, entries: I, now: Instant) -> Result<bool, FieldError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let batch = entries
            .into_iter()
            .map(|(name, value)| self.prepare(name.into(), value.into()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.apply_batch(batch, now))
    }

    /// Restores the install-time snapshot and returns to `Pristine`.
    ///
    /// Cached errors, the submission error and every pending timer are
    /// dropped, so no autosave can write after a reset.
    pub fn reset(&mut self) {
        self.pending_validation.cancel();
        if self.autosave.cancel() {
            tracing::debug!(form_id = ?self.form_id, "pending autosave cancelled by reset");
        }
        self.validation.clear();
        self.submit_error = None;

        let changed: Vec<String> = self
            .values
            .iter()
            .filter(|(name, value)| self.initial.get(name.as_str()) != Some(*value))
            .map(|(name, _)| name.clone())
            .collect();
        self.values = self.initial.clone();

        let from = self.state;
        self.state = FormState::Pristine;
        self.notify(&changed, from);
    }

    /// Sets every input field to null and re-derives computed fields.
    ///
    /// The form is marked dirty even when every field was already null.
    /// Returns whether any stored value changed.
    pub fn clear(&mut self) -> bool {
        let entries: Vec<(String, FieldValue)> = self
            .fields
            .values()
            .filter(|f| !f.is_computed())
            .map(|f| (f.name.clone(), FieldValue::Null))
            .collect();
        let changed = self.apply_batch(entries, Instant::now());
        let from = self.state;
        if !changed && matches!(from, FormState::Pristine | FormState::Submitted) {
            self.state = FormState::Dirty;
            self.notify_state(from);
        }
        changed
    }

    fn prepare(&self, name: String, value: FieldValue) -> Result<(String, FieldValue), FieldError> {
        let field = self
            .fields
            .get(&name)
            .ok_or_else(|| FieldError::UnknownField(name.clone()))?;
        if field.is_computed() {
            return Err(FieldError::ComputedField(name));
        }
        if !value.is_finite() {
            return Err(FieldError::NonFiniteNumber(name));
        }
        if !field.accepts(&value) {
            return Err(FieldError::KindMismatch {
                kind: field.kind,
                found: value.type_name(),
                field: name,
            });
        }
        let value = match (&field.mask, value) {
            (Some(pattern), FieldValue::Text(text)) => FieldValue::Text(apply_mask(pattern, &text)),
            (_, value) => value,
        };
        Ok((name, value))
    }

    /// Stores checked entries and runs everything that follows an update.
    /// Returns false (and does nothing else) when no value changed.
    fn apply_batch(&mut self, entries: Vec<(String, FieldValue)>, now: Instant) -> bool {
        let mut changed: Vec<String> = Vec::new();
        for (name, value) in entries {
            let Some(slot) = self.values.get_mut(&name) else {
                continue;
            };
            if *slot != value {
                *slot = value;
                if !changed.contains(&name) {
                    changed.push(name);
                }
            }
        }
        if changed.is_empty() {
            return false;
        }

        let derived = self.propagate(&changed);
        changed.extend(derived);

        match self.config.validation_mode {
            ValidationMode::OnChange => {
                let targets = lookup(&self.fields, &changed);
                self.validation.run(targets, &self.values);
            }
            ValidationMode::Debounce => {
                let touched: IndexSet<String> = changed.iter().cloned().collect();
                self.pending_validation
                    .schedule_with(now, touched, |pending, more| pending.extend(more));
            }
            ValidationMode::OnNext | ValidationMode::OnExit | ValidationMode::Manual => {}
        }

        let from = self.state;
        if matches!(from, FormState::Pristine | FormState::Submitted) {
            self.state = FormState::Dirty;
        }
        self.notify(&changed, from);

        if self.descriptor.autosave {
            self.schedule_autosave(now);
        }
        true
    }

    /// Recomputes every computed field reachable from `changed`, in
    /// topological order. Returns the ones whose value changed.
    fn propagate(&mut self, changed: &[String]) -> Vec<String> {
        let mut updated = Vec::new();
        for name in self.graph.affected_by(changed.iter().map(String::as_str)) {
            let Some(computed) = self.fields.get(&name).and_then(|f| f.computed.as_ref()) else {
                continue;
            };
            let next = computed.compute(&self.values);
            if self.values.get(&name) != Some(&next) {
                tracing::trace!(field = %name, value = ?next, "computed field updated");
                self.values.insert(name.clone(), next);
                updated.push(name);
            }
        }
        updated
    }

    /// Field listeners, then one form change, then the state change.
    fn notify(&self, changed: &[String], from: FormState) {
        for name in changed {
            if let Some(value) = self.values.get(name) {
                self.listeners.notify_field(name, value);
            }
        }
        if !changed.is_empty() {
            self.listeners.notify_form(&self.values);
        }
        self.notify_state(from);
    }

    fn notify_state(&self, from: FormState) {
        if from != self.state {
            tracing::debug!(?from, to = ?self.state, "form state changed");
            self.listeners.notify_state(from, self.state);
        }
    }

    fn transition(&mut self, to: FormState) {
        let from = self.state;
        self.state = to;
        self.notify_state(from);
    }

    // ─── Visibility & validation ────────────────────────────────────────────

    /// Unknown fields are reported as hidden.
    pub fn is_visible(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .is_some_and(|f| is_visible(f, &self.values))
    }

    pub fn visible_fields(&self) -> Vec<&str> {
        self.fields
            .values()
            .filter(|f| is_visible(f, &self.values))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Validates every visible field and caches the outcome.
    ///
    /// Supersedes any pending debounced pass.
    pub fn validate(&mut self) -> ValidationReport {
        self.pending_validation.cancel();
        self.validation.run(self.fields.values(), &self.values)
    }

    /// Validates the named fields and caches the outcome. Unknown names are
    /// ignored.
    pub fn validate_fields<I, S>(&mut self, names: I) -> ValidationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets = lookup(&self.fields, names);
        self.validation.run(targets, &self.values)
    }

    /// Validates the named fields without caching anything.
    pub fn check_fields<I, S>(&self, names: I) -> ValidationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        validate_all(lookup(&self.fields, names), &self.values)
    }

    /// Whether every visible field passes right now. Caches nothing.
    pub fn is_valid(&self) -> bool {
        validate_all(self.fields.values(), &self.values).is_valid()
    }

    /// Cached errors of the currently visible fields, in declaration order.
    pub fn errors(&self) -> IndexMap<String, String> {
        self.fields
            .values()
            .filter(|f| is_visible(f, &self.values))
            .filter_map(|f| {
                self.validation
                    .cached(&f.name)
                    .map(|message| (f.name.clone(), message.to_string()))
            })
            .collect()
    }

    /// Cached error of one field; `None` while the field is hidden.
    pub fn field_error(&self, name: &str) -> Option<&str> {
        if !self.is_visible(name) {
            return None;
        }
        self.validation.cached(name)
    }

    /// Whether any visible field among `names` holds a cached error.
    pub fn has_errors_in<I, S>(&self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lookup(&self.fields, names)
            .into_iter()
            .any(|f| is_visible(f, &self.values) && self.validation.cached(&f.name).is_some())
    }

    pub fn has_pending_validation(&self) -> bool {
        self.pending_validation.is_pending()
    }

    /// Runs the debounced validation pass if its quiet window has elapsed.
    pub fn poll_validation(&mut self, now: Instant) -> Option<ValidationReport> {
        let touched = self.pending_validation.take_due(now)?;
        let targets = lookup(&self.fields, &touched);
        let report = self.validation.run(targets, &self.values);
        tracing::debug!(
            fields = touched.len(),
            errors = report.len(),
            "debounced validation ran"
        );
        Some(report)
    }

    // ─── Timers & drafts ────────────────────────────────────────────────────

    /// Drives the passive timers: the debounced validation pass and the
    /// autosave write.
    pub async fn tick(&mut self, now: Instant) {
        self.poll_validation(now);
        self.flush_autosave(now).await;
    }

    pub fn has_pending_autosave(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Arms the autosave timer with the current values. A later call before
    /// the write replaces the snapshot.
    pub(crate) fn schedule_autosave(&mut self, now: Instant) {
        if self.form_id.is_none() {
            return;
        }
        self.autosave.schedule(now, self.values.clone());
    }

    pub fn cancel_autosave(&mut self) -> bool {
        self.autosave.cancel()
    }

    /// Writes the scheduled snapshot if its window has elapsed. Returns the
    /// write outcome, or `None` when nothing was due.
    pub async fn flush_autosave(&mut self, now: Instant) -> Option<bool> {
        let snapshot = self.autosave.take_due(now)?;
        let saved = self.write_draft(&snapshot).await;
        tracing::debug!(form_id = ?self.form_id, saved, "autosave flushed");
        Some(saved)
    }

    /// Saves the current values immediately, superseding a pending autosave.
    pub async fn save_draft(&mut self) -> bool {
        self.autosave.cancel();
        let values = self.values.clone();
        self.write_draft(&values).await
    }

    async fn write_draft(&self, values: &ValueMap) -> bool {
        let (Some(store), Some(id)) = (&self.drafts, &self.form_id) else {
            tracing::debug!("no draft store or form id; draft not written");
            return false;
        };
        store.save(id, values).await
    }

    /// Loads the saved draft into the store as one update.
    ///
    /// Entries for unknown or computed fields, and values the field's kind
    /// does not accept, are skipped. Returns whether a draft was found.
    pub async fn restore_draft(&mut self) -> bool {
        let (Some(store), Some(id)) = (self.drafts.clone(), self.form_id.clone()) else {
            return false;
        };
        let Some(saved) = store.load(&id).await else {
            return false;
        };

        let mut entries = Vec::with_capacity(saved.len());
        for (name, value) in saved {
            match self.fields.get(&name) {
                Some(field) if !field.is_computed() && field.accepts(&value) => {
                    entries.push((name, value));
                }
                Some(_) => tracing::debug!(field = %name, "draft entry not applicable; skipped"),
                None => tracing::debug!(field = %name, "draft entry for unknown field; skipped"),
            }
        }
        let edits_pending = self.autosave.is_pending();
        self.apply_batch(entries, Instant::now());
        // Without earlier edits the values are what the draft already holds.
        if !edits_pending {
            self.autosave.cancel();
        }
        tracing::info!(form_id = %id, "draft restored");
        true
    }

    /// Cancels any pending autosave and deletes the saved draft.
    pub async fn discard_draft(&mut self) -> bool {
        self.autosave.cancel();
        match (&self.drafts, &self.form_id) {
            (Some(store), Some(id)) => store.delete(id).await,
            _ => false,
        }
    }

    // ─── Submission & lifecycle ─────────────────────────────────────────────

    /// Validates, then hands a copy of the values to `submit`.
    ///
    /// On success the state becomes `Submitted` and the saved draft is
    /// deleted. On failure the message is recorded, the state becomes
    /// `Failed` and the error is returned; nothing is retried.
    ///
    /// Input is not blocked while the submission is in flight; callers
    /// disable their own input.
    pub async fn submit<F, Fut, E>(&mut self, submit: F) -> Result<(), SubmissionError>
    where
        F: FnOnce(ValueMap) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: fmt::Display,
    {
        let report = self.validate();
        if !report.is_valid() {
            tracing::debug!(errors = report.len(), "submission blocked by validation");
            return Err(SubmissionError::Invalid {
                errors: report.len(),
            });
        }

        self.submit_error = None;
        self.transition(FormState::Submitting);
        match submit(self.get_all()).await {
            Ok(()) => {
                self.transition(FormState::Submitted);
                tracing::info!(form_id = ?self.form_id, "form submitted");
                self.discard_draft().await;
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(form_id = ?self.form_id, error = %message, "submission failed");
                self.submit_error = Some(message.clone());
                self.transition(FormState::Failed);
                Err(SubmissionError::Rejected(message))
            }
        }
    }

    /// Releases every listener and cancels pending timers. The controller
    /// is consumed.
    pub fn dispose(mut self) {
        self.pending_validation.cancel();
        if self.autosave.cancel() {
            tracing::debug!(form_id = ?self.form_id, "pending autosave cancelled by dispose");
        }
        self.listeners.clear();
        tracing::debug!(form_id = ?self.form_id, "form disposed");
    }
}

impl fmt::Debug for FormController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormController")
            .field("form_id", &self.form_id)
            .field("state", &self.state)
            .field("fields", &self.fields.len())
            .field("mode", &self.config.validation_mode)
            .finish_non_exhaustive()
    }
}

fn lookup<'a, I, S>(
    fields: &'a IndexMap<String, FieldDescriptor>,
    names: I,
) -> Vec<&'a FieldDescriptor>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| fields.get(name.as_ref()))
        .collect()
}
