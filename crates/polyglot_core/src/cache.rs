//! In-memory cache of loaded translation resources.

use std::collections::HashMap;

/// Key -> translated text for one locale
pub type Translations = HashMap<String, String>;

/// Locale id -> loaded translations.
///
/// Entries are created by loading and removed only by an explicit unload;
/// nothing is evicted automatically.
#[derive(Debug, Clone, Default)]
pub struct LoadedResources {
    locales: HashMap<String, Translations>,
}

impl LoadedResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store translations for `locale`, replacing any previous entry
    pub fn insert(&mut self, locale: impl Into<String>, translations: Translations) {
        self.locales.insert(locale.into(), translations);
    }

    pub fn get(&self, locale: &str) -> Option<&Translations> {
        self.locales.get(locale)
    }

    /// Single translation lookup
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.locales.get(locale)?.get(key).map(String::as_str)
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.locales.contains_key(locale)
    }

    /// Remove exactly one locale; returns its translations if it was loaded
    pub fn remove(&mut self, locale: &str) -> Option<Translations> {
        self.locales.remove(locale)
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }

    /// Loaded locale ids, sorted
    pub fn locales(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.locales.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Translation count per locale
    pub fn stats(&self) -> HashMap<String, usize> {
        self.locales
            .iter()
            .map(|(locale, translations)| (locale.clone(), translations.len()))
            .collect()
    }
}
