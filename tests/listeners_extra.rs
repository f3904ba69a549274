use formstate::{
    FieldDescriptor, FieldValue, FormConfig, FormController, FormDescriptor, FormState, ListenerId,
    ListenerRegistry,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn form() -> FormController {
    FormController::new(
        FormDescriptor::with_fields(vec![FieldDescriptor::text("a"), FieldDescriptor::text("b")]),
        FormConfig::default(),
    )
    .unwrap()
}

type Log = Rc<RefCell<Vec<&'static str>>>;

fn push(log: &Log, entry: &'static str) -> impl Fn(&formstate::ValueMap) + 'static {
    let log = Rc::clone(log);
    move |_| log.borrow_mut().push(entry)
}

#[test]
fn listener_removing_itself_does_not_skip_others() {
    let mut form = form();
    let registry = form.listeners().clone();
    let log: Log = Rc::default();

    registry.on_form_change(push(&log, "first"));

    let own_id: Rc<Cell<Option<ListenerId>>> = Rc::default();
    let (r, id, l) = (registry.clone(), Rc::clone(&own_id), Rc::clone(&log));
    let id_value = registry.on_form_change(move |_| {
        l.borrow_mut().push("once");
        if let Some(id) = id.get() {
            r.remove(id);
        }
    });
    own_id.set(Some(id_value));

    registry.on_form_change(push(&log, "last"));

    form.set("a", "1").unwrap();
    assert_eq!(*log.borrow(), vec!["first", "once", "last"]);

    log.borrow_mut().clear();
    form.set("a", "2").unwrap();
    assert_eq!(*log.borrow(), vec!["first", "last"]);
}

#[test]
fn removing_a_later_listener_takes_effect_next_dispatch() {
    let mut form = form();
    let registry = form.listeners().clone();
    let log: Log = Rc::default();

    let victim: Rc<Cell<Option<ListenerId>>> = Rc::default();
    let (r, v, l) = (registry.clone(), Rc::clone(&victim), Rc::clone(&log));
    registry.on_form_change(move |_| {
        l.borrow_mut().push("remover");
        if let Some(id) = v.take() {
            assert!(r.remove(id));
        }
    });
    victim.set(Some(registry.on_form_change(push(&log, "victim"))));

    form.set("a", "1").unwrap();
    assert_eq!(*log.borrow(), vec!["remover", "victim"]);

    log.borrow_mut().clear();
    form.set("a", "2").unwrap();
    assert_eq!(*log.borrow(), vec!["remover"]);
}

#[test]
fn listener_added_during_dispatch_starts_next_time() {
    let mut form = form();
    let registry = form.listeners().clone();
    let log: Log = Rc::default();

    let added = Rc::new(Cell::new(false));
    let (r, a, l) = (registry.clone(), Rc::clone(&added), Rc::clone(&log));
    registry.on_form_change(move |_| {
        l.borrow_mut().push("adder");
        if !a.replace(true) {
            r.on_form_change(push(&l, "late"));
        }
    });

    form.set("a", "1").unwrap();
    assert_eq!(*log.borrow(), vec!["adder"]);

    log.borrow_mut().clear();
    form.set("a", "2").unwrap();
    assert_eq!(*log.borrow(), vec!["adder", "late"]);
}

#[test]
fn field_listener_may_unsubscribe_everything() {
    let mut form = form();
    let registry = form.listeners().clone();
    let calls = Rc::new(Cell::new(0));

    for _ in 0..3 {
        let (r, c) = (registry.clone(), Rc::clone(&calls));
        registry.on_field_change("a", move |_, _| {
            c.set(c.get() + 1);
            r.clear();
        });
    }

    form.set("a", "1").unwrap();
    assert_eq!(calls.get(), 3);
    assert!(registry.is_empty());

    form.set("a", "2").unwrap();
    assert_eq!(calls.get(), 3);
}

#[test]
fn state_listener_sees_each_transition() {
    let mut form = form();
    let transitions = Rc::new(RefCell::new(Vec::new()));
    let t = Rc::clone(&transitions);
    form.listeners()
        .on_state_change(move |from, to| t.borrow_mut().push((from, to)));

    form.set("a", "x").unwrap();
    form.set("b", "y").unwrap();
    form.reset();

    assert_eq!(
        *transitions.borrow(),
        vec![
            (FormState::Pristine, FormState::Dirty),
            (FormState::Dirty, FormState::Pristine),
        ]
    );
}

#[test]
fn field_listener_receives_the_stored_value() {
    let mut form = form();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    form.listeners().on_field_change("b", move |name, value| {
        s.borrow_mut().push((name.to_string(), value.clone()));
    });

    form.set("a", "ignored").unwrap();
    form.set("b", "kept").unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![("b".to_string(), FieldValue::from("kept"))]
    );
}

#[test]
fn remove_reports_unknown_ids() {
    let registry = ListenerRegistry::new();
    let id = registry.on_state_change(|_, _| {});
    assert_eq!(registry.len(), 1);
    assert!(registry.remove(id));
    assert!(!registry.remove(id));
    assert!(registry.is_empty());
}
