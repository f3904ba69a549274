//! Change subscribers.
//!
//! The registry is a cheap-to-clone handle over shared, single-threaded
//! state, so a listener may capture a clone and subscribe or unsubscribe
//! from inside its own callback. Every dispatch first copies the relevant
//! subscriber list and releases the borrow before calling anyone: changes
//! made during a dispatch take effect from the next dispatch on, and no
//! listener of the current pass is skipped or called twice.

use std::cell::RefCell;
use std::rc::Rc;

use crate::enums::FormState;
use crate::value::{FieldValue, ValueMap};

/// Handle returned by every `on_*` call; pass it to
/// [`ListenerRegistry::remove`] to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type FieldListener = Rc<dyn Fn(&str, &FieldValue)>;
type FormListener = Rc<dyn Fn(&ValueMap)>;
type StateListener = Rc<dyn Fn(FormState, FormState)>;

struct FieldEntry {
    id: ListenerId,
    /// `None` subscribes to every field.
    field: Option<String>,
    callback: FieldListener,
}

#[derive(Default)]
struct Lists {
    next_id: u64,
    field: Vec<FieldEntry>,
    form: Vec<(ListenerId, FormListener)>,
    state: Vec<(ListenerId, StateListener)>,
}

impl Lists {
    fn allocate(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }
}

#[derive(Clone, Default)]
pub struct ListenerRegistry {
    lists: Rc<RefCell<Lists>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to value changes of one field.
    pub fn on_field_change(
        &self,
        field: impl Into<String>,
        callback: impl Fn(&str, &FieldValue) + 'static,
    ) -> ListenerId {
        self.push_field(Some(field.into()), Rc::new(callback))
    }

    /// Subscribe to value changes of every field.
    pub fn on_any_field_change(&self, callback: impl Fn(&str, &FieldValue) + 'static) -> ListenerId {
        self.push_field(None, Rc::new(callback))
    }

    /// Subscribe to whole-form data changes (once per update batch).
    pub fn on_form_change(&self, callback: impl Fn(&ValueMap) + 'static) -> ListenerId {
        let mut lists = self.lists.borrow_mut();
        let id = lists.allocate();
        lists.form.push((id, Rc::new(callback)));
        id
    }

    /// Subscribe to form state transitions; called with `(from, to)`.
    pub fn on_state_change(&self, callback: impl Fn(FormState, FormState) + 'static) -> ListenerId {
        let mut lists = self.lists.borrow_mut();
        let id = lists.allocate();
        lists.state.push((id, Rc::new(callback)));
        id
    }

    fn push_field(&self, field: Option<String>, callback: FieldListener) -> ListenerId {
        let mut lists = self.lists.borrow_mut();
        let id = lists.allocate();
        lists.field.push(FieldEntry {
            id,
            field,
            callback,
        });
        id
    }

    /// Removes a subscription of any kind. Returns false for unknown ids.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut lists = self.lists.borrow_mut();
        let before = lists.field.len() + lists.form.len() + lists.state.len();
        lists.field.retain(|e| e.id != id);
        lists.form.retain(|(i, _)| *i != id);
        lists.state.retain(|(i, _)| *i != id);
        before != lists.field.len() + lists.form.len() + lists.state.len()
    }

    /// Drops every subscription.
    pub fn clear(&self) {
        let mut lists = self.lists.borrow_mut();
        lists.field.clear();
        lists.form.clear();
        lists.state.clear();
    }

    pub fn len(&self) -> usize {
        let lists = self.lists.borrow();
        lists.field.len() + lists.form.len() + lists.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify_field(&self, field: &str, value: &FieldValue) {
        let snapshot: Vec<FieldListener> = self
            .lists
            .borrow()
            .field
            .iter()
            .filter(|e| e.field.as_deref().is_none_or(|f| f == field))
            .map(|e| Rc::clone(&e.callback))
            .collect();
        for callback in snapshot {
            callback(field, value);
        }
    }

    pub fn notify_form(&self, values: &ValueMap) {
        let snapshot: Vec<FormListener> = self
            .lists
            .borrow()
            .form
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(values);
        }
    }

    pub fn notify_state(&self, from: FormState, to: FormState) {
        let snapshot: Vec<StateListener> = self
            .lists
            .borrow()
            .state
            .iter()
            .map(|(_, cb)| Rc::clone(cb))
            .collect();
        for callback in snapshot {
            callback(from, to);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lists = self.lists.borrow();
        f.debug_struct("ListenerRegistry")
            .field("field", &lists.field.len())
            .field("form", &lists.form.len())
            .field("state", &lists.state.len())
            .finish()
    }
}
