//! Draft persistence.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │ DraftStore                                    │
//! │  - encodes value maps (tagged datetimes)      │
//! │  - swallows and logs backend failures         │
//! └───────────────────────────────────────────────┘
//!                        │
//!                        ▼
//! ┌───────────────────────────────────────────────┐
//! │ DraftBackend (async key → string)             │
//! │  - MemoryBackend: in-memory, tests/ephemeral  │
//! │  - host-provided platform storage             │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Drafts are a convenience: a failing backend never fails the form. Every
//! [`DraftStore`] operation resolves to `false` / `None` on error and logs
//! the cause.

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{StorageError, StorageResult};
use crate::value::{FieldValue, ValueMap};

const KEY_PREFIX: &str = "form_draft_";

/// Asynchronous key-value storage consumed by [`DraftStore`].
///
/// Implementations are free to fail; the store handles every error.
pub trait DraftBackend {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn read<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, StorageResult<Option<String>>>;

    fn write<'a>(&'a self, key: &'a str, data: String) -> LocalBoxFuture<'a, StorageResult<()>>;

    fn contains<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, StorageResult<bool>>;

    /// Returns whether an entry was removed.
    fn remove<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, StorageResult<bool>>;
}

/// In-memory backend. Contents are lost with the process.
#[derive(Default)]
pub struct MemoryBackend {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text for `key`, bypassing decoding.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: impl Into<String>, data: impl Into<String>) {
        self.entries.borrow_mut().insert(key.into(), data.into());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl DraftBackend for MemoryBackend {
    fn name(&self) -> &str {
        "MemoryBackend"
    }

    fn read<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, StorageResult<Option<String>>> {
        async move { Ok(self.entries.borrow().get(key).cloned()) }.boxed_local()
    }

    fn write<'a>(&'a self, key: &'a str, data: String) -> LocalBoxFuture<'a, StorageResult<()>> {
        async move {
            self.entries.borrow_mut().insert(key.to_string(), data);
            Ok(())
        }
        .boxed_local()
    }

    fn contains<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, StorageResult<bool>> {
        async move { Ok(self.entries.borrow().contains_key(key)) }.boxed_local()
    }

    fn remove<'a>(&'a self, key: &'a str) -> LocalBoxFuture<'a, StorageResult<bool>> {
        async move { Ok(self.entries.borrow_mut().remove(key).is_some()) }.boxed_local()
    }
}

impl fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("entries", &self.entries.borrow().len())
            .finish()
    }
}

/// Best-effort draft persistence keyed by form id.
#[derive(Clone)]
pub struct DraftStore {
    backend: Rc<dyn DraftBackend>,
}

impl DraftStore {
    pub fn new(backend: impl DraftBackend + 'static) -> Self {
        Self {
            backend: Rc::new(backend),
        }
    }

    pub fn from_shared(backend: Rc<dyn DraftBackend>) -> Self {
        Self { backend }
    }

    /// Storage key used for a form id.
    pub fn key_for(id: &str) -> String {
        format!("{KEY_PREFIX}{id}")
    }

    pub async fn save(&self, id: &str, values: &ValueMap) -> bool {
        let key = Self::key_for(id);
        let result: StorageResult<()> = async {
            let data = encode_values(values)?;
            self.backend.write(&key, data).await
        }
        .await;
        match result {
            Ok(()) => {
                tracing::debug!(form_id = %id, fields = values.len(), "draft saved");
                true
            }
            Err(e) => {
                tracing::warn!(form_id = %id, backend = self.backend.name(), error = %e, "failed to save draft");
                false
            }
        }
    }

    pub async fn load(&self, id: &str) -> Option<ValueMap> {
        let key = Self::key_for(id);
        let result: StorageResult<Option<ValueMap>> = async {
            match self.backend.read(&key).await? {
                Some(data) => decode_values(&data).map(Some),
                None => Ok(None),
            }
        }
        .await;
        match result {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!(form_id = %id, backend = self.backend.name(), error = %e, "failed to load draft");
                None
            }
        }
    }

    pub async fn has(&self, id: &str) -> bool {
        match self.backend.contains(&Self::key_for(id)).await {
            Ok(present) => present,
            Err(e) => {
                tracing::warn!(form_id = %id, backend = self.backend.name(), error = %e, "failed to query draft");
                false
            }
        }
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.backend.remove(&Self::key_for(id)).await {
            Ok(removed) => {
                tracing::debug!(form_id = %id, removed, "draft deleted");
                removed
            }
            Err(e) => {
                tracing::warn!(form_id = %id, backend = self.backend.name(), error = %e, "failed to delete draft");
                false
            }
        }
    }
}

impl fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Encodes a value map as a JSON object in map order.
pub fn encode_values(values: &ValueMap) -> StorageResult<String> {
    Ok(serde_json::to_string(values)?)
}

/// Decodes a JSON object produced by [`encode_values`].
pub fn decode_values(data: &str) -> StorageResult<ValueMap> {
    let raw: serde_json::Value = serde_json::from_str(data)?;
    let serde_json::Value::Object(map) = raw else {
        return Err(StorageError::Corruption(
            "draft root must be a JSON object".to_string(),
        ));
    };
    let mut values = ValueMap::with_capacity(map.len());
    for (name, value) in &map {
        let decoded = FieldValue::from_json(value)
            .map_err(|e| StorageError::Corruption(format!("field '{}': {}", name, e)))?;
        values.insert(name.clone(), decoded);
    }
    Ok(values)
}
