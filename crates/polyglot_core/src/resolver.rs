//! Active-locale detection from persisted preferences and request signals.

use std::time::Duration;

use crate::error::LocaleError;
use crate::request::{accept_language_codes, RequestSignals};
use crate::store::PreferenceStore;

/// Ordered set of locales the application ships resources for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedLocales {
    locales: Vec<String>,
}

impl SupportedLocales {
    pub fn new<I, S>(locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for locale in locales {
            set.insert(locale);
        }
        set
    }

    pub fn contains(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Append `locale` if absent; returns true when it was added
    pub fn insert(&mut self, locale: impl Into<String>) -> bool {
        let locale = locale.into();
        if self.contains(&locale) {
            return false;
        }
        self.locales.push(locale);
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.locales
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locales.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

/// A preference store bound to the key (and lifetime) it persists under
struct PersistedSlot {
    store: Box<dyn PreferenceStore>,
    key: String,
    ttl: Option<Duration>,
    label: &'static str,
    // cookie jars read the inbound request, so only the session is read back
    read_back: bool,
}

impl PersistedSlot {
    fn value(&self) -> Option<String> {
        self.store.get(&self.key).filter(|v| !v.is_empty())
    }

    fn write(&mut self, locale: &str) -> Result<(), LocaleError> {
        let stored = self.store.set(&self.key, locale, self.ttl);
        let kept = !self.read_back || self.store.get(&self.key).as_deref() == Some(locale);
        if stored && kept {
            Ok(())
        } else {
            Err(LocaleError::persistence(self.label, &self.key).with_context("locale", locale))
        }
    }
}

/// Determines the active locale for one request scope.
///
/// Signals are consulted in order: session, cookie, `Accept-Language`, then
/// the configured default.
pub struct LocaleResolver {
    session: Option<PersistedSlot>,
    cookie: Option<PersistedSlot>,
    request: RequestSignals,
}

impl LocaleResolver {
    pub fn new(request: RequestSignals) -> Self {
        Self {
            session: None,
            cookie: None,
            request,
        }
    }

    /// Enable session persistence
    pub fn with_session(mut self, store: Box<dyn PreferenceStore>, key: impl Into<String>) -> Self {
        self.session = Some(PersistedSlot {
            store,
            key: key.into(),
            ttl: None,
            label: "session",
            read_back: true,
        });
        self
    }

    /// Enable cookie persistence
    pub fn with_cookie(mut self, store: Box<dyn PreferenceStore>, key: impl Into<String>, ttl: Duration) -> Self {
        self.cookie = Some(PersistedSlot {
            store,
            key: key.into(),
            ttl: Some(ttl),
            label: "cookie",
            read_back: false,
        });
        self
    }

    pub fn request(&self) -> &RequestSignals {
        &self.request
    }

    pub fn set_request(&mut self, request: RequestSignals) {
        self.request = request;
    }

    pub fn session_enabled(&self) -> bool {
        self.session.is_some()
    }

    pub fn cookie_enabled(&self) -> bool {
        self.cookie.is_some()
    }

    pub fn session_value(&self) -> Option<String> {
        self.session.as_ref().and_then(PersistedSlot::value)
    }

    pub fn cookie_value(&self) -> Option<String> {
        self.cookie.as_ref().and_then(PersistedSlot::value)
    }

    /// First `Accept-Language` entry that is a supported locale
    pub fn header_candidate(&self, supported: &SupportedLocales) -> Option<String> {
        let header = self.request.accept_language.as_deref()?;
        accept_language_codes(header).find(|code| supported.contains(code))
    }

    /// Detect the locale and write it back to the enabled stores.
    ///
    /// The first present signal wins; when it is not supported the default
    /// locale is used instead. Persistence failures are logged, never raised.
    pub fn resolve(&mut self, supported: &SupportedLocales, default_locale: &str) -> String {
        let candidate = self
            .session_value()
            .or_else(|| self.cookie_value())
            .or_else(|| self.header_candidate(supported));

        let locale = match candidate {
            Some(locale) if supported.contains(&locale) => locale,
            _ => default_locale.to_string(),
        };

        for failure in self.persist(&locale) {
            crate::polyglot_log_warn!(locale = %locale, "could not persist detected locale: {}", failure.message);
        }

        crate::polyglot_log_debug!(locale = %locale, "resolved locale");
        locale
    }

    /// Candidate used when an explicit one is missing or unsupported:
    /// request override, then session, then cookie, then [`resolve`](Self::resolve).
    pub fn rederive(&mut self, supported: &SupportedLocales, default_locale: &str) -> String {
        if let Some(param) = self.request.override_param() {
            return param.to_string();
        }
        if let Some(value) = self.session_value() {
            return value;
        }
        if let Some(value) = self.cookie_value() {
            return value;
        }
        self.resolve(supported, default_locale)
    }

    /// Write `locale` to every enabled store; returns one error per failed store.
    pub fn persist(&mut self, locale: &str) -> Vec<LocaleError> {
        [self.session.as_mut(), self.cookie.as_mut()]
            .into_iter()
            .flatten()
            .filter_map(|slot| slot.write(locale).err())
            .collect()
    }
}
