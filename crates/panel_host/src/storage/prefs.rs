//! Per-user preference storage for the file manager.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Object-safe boxed future used by [`PrefsStore`] async methods.
pub type PrefsStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures while loading or saving preferences.
pub enum PrefsError {
    /// The backing store rejected the operation.
    #[error("preference store failed: {0}")]
    Store(String),
    /// The stored JSON could not be encoded or decoded.
    #[error("preference value is not valid JSON: {0}")]
    Codec(String),
}

/// Host service for small preference values stored as JSON text per key.
pub trait PrefsStore {
    /// Loads the raw JSON stored under `key`.
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, PrefsError>>;

    /// Stores raw JSON under `key`.
    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), PrefsError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Store that persists nothing; every load is empty.
pub struct NoopPrefsStore;

impl PrefsStore for NoopPrefsStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, PrefsError>> {
        Box::pin(async { Ok(None) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), PrefsError>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone, Default)]
/// Session-local preference store; clones share the same map.
pub struct MemoryPrefsStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
    outage: Rc<RefCell<Option<String>>>,
}

impl MemoryPrefsStore {
    /// Returns the raw JSON stored under `key`, bypassing the async contract.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    /// Makes every load and save fail with `reason` until [`MemoryPrefsStore::recover`].
    pub fn fail_with(&self, reason: &str) -> &Self {
        *self.outage.borrow_mut() = Some(reason.to_string());
        self
    }

    /// Ends an outage started by [`MemoryPrefsStore::fail_with`].
    pub fn recover(&self) -> &Self {
        *self.outage.borrow_mut() = None;
        self
    }

    fn available(&self) -> Result<(), PrefsError> {
        match self.outage.borrow().as_ref() {
            Some(reason) => Err(PrefsError::Store(reason.clone())),
            None => Ok(()),
        }
    }
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, PrefsError>> {
        Box::pin(async move {
            self.available()?;
            Ok(self.raw(key))
        })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), PrefsError>> {
        Box::pin(async move {
            self.available()?;
            self.inner
                .borrow_mut()
                .insert(key.to_string(), raw_json.to_string());
            Ok(())
        })
    }
}

/// Loads and decodes a typed preference value.
///
/// # Errors
///
/// Returns [`PrefsError`] when the store fails or the stored JSON does not decode as `T`.
pub async fn load_pref_with<S: PrefsStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, PrefsError> {
    let Some(raw) = store.load_pref(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| PrefsError::Codec(e.to_string()))?;
    Ok(Some(value))
}

/// Encodes and saves a typed preference value.
///
/// # Errors
///
/// Returns [`PrefsError`] when encoding or the store save fails.
pub async fn save_pref_with<S: PrefsStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), PrefsError> {
    let raw = serde_json::to_string(value).map_err(|e| PrefsError::Codec(e.to_string()))?;
    store.save_pref(key, &raw).await
}
