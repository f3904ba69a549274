//! Multi-step wizard over one shared value map.
//!
//! ```text
//!   ┌────────┐  next   ┌────────┐  next   ┌────────┐  next
//!   │ step 0 │ ──────► │ step 1 │ ──────► │ step 2 │ ──────► completed
//!   └────────┘ ◄────── └────────┘ ◄────── └────────┘
//!               back / go_to (visited, not past current)
//! ```
//!
//! Every step's fields live in a single [`FormController`], so computed
//! fields and visibility conditions may reach across steps. Advancing
//! requires the current step to pass validation for the active mode and the
//! optional guard to agree. Forward jumps are only possible through `next`.

use std::fmt;
use std::time::Instant;

use crate::check::check_session;
use crate::config::SessionConfig;
use crate::controller::FormController;
use crate::drafts::DraftStore;
use crate::enums::{Navigation, ValidationMode};
use crate::error::{ConfigError, FieldError};
use crate::types::FormDescriptor;
use crate::value::{FieldValue, ValueMap};

#[derive(Clone, Debug)]
struct Step {
    title: Option<String>,
    fields: Vec<String>,
}

pub struct WizardSession {
    controller: FormController,
    config: SessionConfig,
    steps: Vec<Step>,
    current: usize,
    visited: Vec<bool>,
    completed: bool,
}

impl WizardSession {
    /// Installs a wizard. The first step starts visited.
    ///
    /// # Errors
    ///
    /// Returns the session-level problems (no steps, autosave without a
    /// form id) together with every configuration error of the steps.
    pub fn new(steps: Vec<FormDescriptor>, config: SessionConfig) -> Result<Self, Vec<ConfigError>> {
        let mut errors = check_session(&steps, &config);

        let layout: Vec<Step> = steps
            .iter()
            .map(|step| Step {
                title: step.title.clone(),
                fields: step.field_names(),
            })
            .collect();

        let mut root = FormDescriptor::with_sections(steps);
        if let Some(id) = &config.form_id {
            root = root.form_id(id.clone());
        }
        let controller = match FormController::new(root, config.form_config()) {
            Ok(controller) => Some(controller),
            Err(step_errors) => {
                errors.extend(step_errors);
                None
            }
        };

        let controller = match controller {
            Some(controller) if errors.is_empty() => controller,
            _ => {
                tracing::warn!(errors = errors.len(), "wizard configuration rejected");
                return Err(errors);
            }
        };

        let mut visited = vec![false; layout.len()];
        visited[0] = true;
        tracing::info!(
            form_id = ?config.form_id,
            steps = layout.len(),
            autosave = config.autosave_progress,
            "wizard installed"
        );
        Ok(Self {
            controller,
            config,
            steps: layout,
            current: 0,
            visited,
            completed: false,
        })
    }

    pub fn with_draft_store(mut self, store: DraftStore) -> Self {
        self.controller.set_draft_store(store);
        self
    }

    /// The shared controller, read-only. Updates go through the session so
    /// the step layout always matches the installed fields.
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.controller.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<bool, FieldError> {
        self.controller.set(name, value)
    }

    /// Sets several fields, possibly on different steps, as one update.
    pub fn set_many<I, K, V>(&mut self, entries: I) -> Result<bool, FieldError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.controller.set_many(entries)
    }

    pub fn values(&self) -> &ValueMap {
        self.controller.values()
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_title(&self, index: usize) -> Option<&str> {
        self.steps.get(index).and_then(|s| s.title.as_deref())
    }

    pub fn step_fields(&self, index: usize) -> &[String] {
        self.steps
            .get(index)
            .map(|s| s.fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_visited(&self, index: usize) -> bool {
        self.visited.get(index).copied().unwrap_or(false)
    }

    pub fn visited(&self) -> &[bool] {
        &self.visited
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// One-based position of the current step and the step count.
    /// A completed session reports `(total, total)`.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.steps.len();
        if self.completed {
            (total, total)
        } else {
            (self.current + 1, total)
        }
    }

    /// Whether the visible fields of a step pass right now. Caches nothing.
    pub fn step_is_valid(&self, index: usize) -> bool {
        match self.steps.get(index) {
            Some(step) => self.controller.check_fields(&step.fields).is_valid(),
            None => false,
        }
    }

    /// Validates the current step and caches the errors.
    pub fn validate_step(&mut self) -> bool {
        let fields = &self.steps[self.current].fields;
        self.controller.validate_fields(fields).is_valid()
    }

    // ─── Navigation ─────────────────────────────────────────────────────────

    /// Advances one step, or completes the session from the last step.
    pub async fn next(&mut self) -> Navigation {
        self.advance(|_, _| true).await
    }

    /// [`next`](Self::next) gated by a predicate over the current step
    /// index and the current values.
    pub async fn next_with_guard(
        &mut self,
        guard: impl FnOnce(usize, &ValueMap) -> bool,
    ) -> Navigation {
        self.advance(guard).await
    }

    async fn advance(&mut self, guard: impl FnOnce(usize, &ValueMap) -> bool) -> Navigation {
        if self.completed {
            return Navigation::Refused;
        }
        if !self.current_step_passes() {
            tracing::debug!(step = self.current, "advance blocked by validation");
            return Navigation::BlockedByValidation;
        }
        if !guard(self.current, self.controller.values()) {
            tracing::debug!(step = self.current, "advance blocked by guard");
            return Navigation::BlockedByGuard;
        }

        if self.current + 1 == self.steps.len() {
            self.complete().await;
            return Navigation::Completed;
        }
        self.current += 1;
        self.visited[self.current] = true;
        self.after_transition();
        Navigation::Moved(self.current)
    }

    /// `manual` only consults errors cached by an explicit validation; every
    /// other mode validates the step now.
    fn current_step_passes(&mut self) -> bool {
        let fields = &self.steps[self.current].fields;
        match self.config.validation_mode {
            ValidationMode::Manual => !self.controller.has_errors_in(fields),
            ValidationMode::OnNext
            | ValidationMode::OnChange
            | ValidationMode::Debounce
            | ValidationMode::OnExit => self.controller.validate_fields(fields).is_valid(),
        }
    }

    /// Moves to the previous step.
    pub fn back(&mut self) -> Navigation {
        if self.completed || self.current == 0 {
            return Navigation::Refused;
        }
        self.go_to(self.current - 1)
    }

    /// Moves to a visited step at or before the current one.
    ///
    /// In `onExit` mode the step being left must validate first.
    pub fn go_to(&mut self, index: usize) -> Navigation {
        if self.completed || index > self.current || !self.is_visited(index) {
            tracing::debug!(from = self.current, to = index, "navigation refused");
            return Navigation::Refused;
        }
        if index == self.current {
            return Navigation::Moved(index);
        }
        if self.config.validation_mode == ValidationMode::OnExit && !self.validate_step() {
            tracing::debug!(step = self.current, "leaving step blocked by validation");
            return Navigation::BlockedByValidation;
        }
        self.current = index;
        self.after_transition();
        Navigation::Moved(index)
    }

    fn after_transition(&mut self) {
        tracing::debug!(step = self.current, "step changed");
        if self.config.autosave_progress {
            self.controller.schedule_autosave(Instant::now());
        }
    }

    async fn complete(&mut self) {
        self.completed = true;
        self.controller.cancel_autosave();
        if self.config.form_id.is_some() {
            self.controller.discard_draft().await;
        }
        tracing::info!(form_id = ?self.config.form_id, "wizard completed");
    }

    // ─── Timers, drafts & lifecycle ─────────────────────────────────────────

    pub async fn tick(&mut self, now: Instant) {
        self.controller.tick(now).await;
    }

    pub fn has_pending_autosave(&self) -> bool {
        self.controller.has_pending_autosave()
    }

    /// Loads a saved draft into the shared value map.
    pub async fn restore_draft(&mut self) -> bool {
        self.controller.restore_draft().await
    }

    /// Returns to the first step with the install-time values. Any pending
    /// autosave is cancelled.
    pub fn reset(&mut self) {
        self.controller.reset();
        self.current = 0;
        self.completed = false;
        self.visited.fill(false);
        self.visited[0] = true;
    }

    pub fn dispose(self) {
        self.controller.dispose();
    }
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("form_id", &self.config.form_id)
            .field("current", &self.current)
            .field("steps", &self.steps.len())
            .field("completed", &self.completed)
            .finish_non_exhaustive()
    }
}
