//! Thread-shareable localizer handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::LocaleResult;
use crate::localizer::{EscapeMode, Localizer};

/// A [`Localizer`] behind one lock, cloneable across threads.
///
/// Loads and reads of the same instance are serialized.
#[derive(Clone)]
pub struct SharedLocalizer {
    inner: Arc<Mutex<Localizer>>,
}

impl SharedLocalizer {
    pub fn new(localizer: Localizer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(localizer)),
        }
    }

    /// Run `f` with exclusive access; a poisoned lock is recovered
    pub fn with<R>(&self, f: impl FnOnce(&mut Localizer) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn t(&self, key: &str) -> String {
        self.with(|l| l.translate(key, EscapeMode::Sanitize))
    }

    pub fn translate(&self, key: &str, mode: EscapeMode) -> String {
        self.with(|l| l.translate(key, mode))
    }

    pub fn translate_plural<V: ToString>(
        &self,
        key: &str,
        count: i64,
        vars: &HashMap<String, V>,
    ) -> LocaleResult<String> {
        self.with(|l| l.translate_plural(key, count, vars))
    }

    pub fn set_active(&self, candidate: Option<&str>, force: bool) -> LocaleResult<String> {
        self.with(|l| l.set_active(candidate, force))
    }

    pub fn locale(&self) -> String {
        self.with(|l| l.locale().to_string())
    }
}

impl From<Localizer> for SharedLocalizer {
    fn from(localizer: Localizer) -> Self {
        Self::new(localizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocaleConfig;
    use crate::resource::MemoryResourceSource;
    use std::thread;

    fn shared() -> SharedLocalizer {
        let source = MemoryResourceSource::new()
            .with("en", r#"{"variables": {}, "hello": "Hello", "n_other": "{{count}} things"}"#)
            .with("fr", r#"{"variables": {}, "hello": "Bonjour"}"#);
        let config = LocaleConfig::default().with_supported_locales(["en", "fr"]);
        Localizer::builder(config)
            .resource_source(source)
            .build()
            .unwrap()
            .into()
    }

    #[test]
    fn clones_share_one_instance() {
        let a = shared();
        let b = a.clone();
        a.set_active(Some("fr"), false).unwrap();
        assert_eq!(b.locale(), "fr");
        assert_eq!(b.t("hello"), "Bonjour");
    }

    #[test]
    fn concurrent_readers_see_consistent_output() {
        let localizer = shared();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let l = localizer.clone();
                thread::spawn(move || {
                    let none: HashMap<String, String> = HashMap::new();
                    (l.t("hello"), l.translate_plural("n", i, &none).unwrap())
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let (hello, plural) = handle.join().unwrap();
            assert_eq!(hello, "Hello");
            if i != 1 {
                assert_eq!(plural, format!("{i} things"));
            }
        }
    }
}
