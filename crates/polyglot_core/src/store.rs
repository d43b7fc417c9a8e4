//! Persisted locale preference stores (session, cookie).

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Key/value store holding a persisted locale preference.
///
/// Session and cookie persistence are two independent instances of this
/// trait; the transport behind them is the caller's concern.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`. Returns false when the store rejected the write.
    fn set(&mut self, key: &str, value: &str, ttl: Option<Duration>) -> bool;
}

/// In-memory store with optional expiry, used by default and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, (String, Option<Instant>)>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one entry
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.into(), (value.into(), None));
        store
    }

    /// A store that rejects every write, e.g. a cookie jar after headers were sent
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let (value, expires) = self.entries.get(key)?;
        match expires {
            Some(deadline) if Instant::now() >= *deadline => None,
            _ => Some(value.clone()),
        }
    }

    fn set(&mut self, key: &str, value: &str, ttl: Option<Duration>) -> bool {
        if self.read_only {
            return false;
        }
        let expires = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.entries.insert(key.to_string(), (value.to_string(), expires));
        true
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str, ttl: Option<Duration>) -> bool {
        (**self).set(key, value, ttl)
    }
}
