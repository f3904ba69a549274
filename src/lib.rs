//! Configuration-driven form state.
//!
//! Given a declarative description of fields (optionally nested into
//! sections or wizard steps), this crate keeps the live values, derives
//! computed fields, evaluates conditional visibility, runs validation under
//! several timing policies and persists drafts. Rendering is left to the
//! host.
//!
//! ```text
//! FormDescriptor ─► FormController::new ─► set / get / validate / submit
//!                                      └─► listeners, autosave, drafts
//! Vec<FormDescriptor> ─► WizardSession::new ─► next / back / go_to
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use formstate::{Computed, FieldDescriptor, FieldValue, FormConfig, FormController, FormDescriptor};
//!
//! let form = FormDescriptor::with_fields(vec![
//!     FieldDescriptor::text("first"),
//!     FieldDescriptor::text("last"),
//!     FieldDescriptor::text("fullName").computed(Computed::new(["first", "last"], |values| {
//!         let part = |name: &str| values.get(name).and_then(FieldValue::as_text).unwrap_or("").to_string();
//!         FieldValue::from(format!("{} {}", part("first"), part("last")).trim().to_string())
//!     })),
//! ]);
//!
//! let mut controller = FormController::new(form, FormConfig::default()).expect("valid form");
//! controller.set("first", "Ada").unwrap();
//! controller.set("last", "Lovelace").unwrap();
//! assert_eq!(controller.get("fullName"), Some(&FieldValue::from("Ada Lovelace")));
//! ```
//!
//! # Time
//!
//! Nothing in this crate sleeps or spawns. Debounced validation and
//! autosave are deadlines; the host passes the current [`Instant`] to
//! [`FormController::tick`] (or [`WizardSession::tick`]) from its own event
//! loop.
//!
//! [`Instant`]: std::time::Instant

pub mod check;
pub mod config;
pub mod controller;
pub mod drafts;
pub mod enums;
pub mod error;
pub mod graph;
pub mod listeners;
pub mod mask;
pub mod session;
pub mod types;
pub mod validation;
pub mod validators;
pub mod value;
pub mod visibility;

pub(crate) mod debounce;

pub use enums::*;
pub use error::*;
pub use types::*;

pub use config::{FormConfig, SessionConfig, parse_json, parse_yaml};
pub use controller::FormController;
pub use drafts::{DraftBackend, DraftStore, MemoryBackend};
pub use listeners::{ListenerId, ListenerRegistry};
pub use session::WizardSession;
pub use validation::ValidationReport;
pub use value::{FieldValue, ValueMap};
