//! Structured error type for locale resolution and translation loading.
//!
//! Every fallible operation in the crate returns [`LocaleResult`]. Whether an
//! error actually reaches the caller is decided by
//! [`ErrorPolicy`](crate::policy::ErrorPolicy) at the call site.

use std::collections::BTreeMap;
use std::fmt;

/// Result type for all localization operations
pub type LocaleResult<T> = Result<T, LocaleError>;

/// Main error type for localization operations
#[derive(Debug, Clone)]
pub struct LocaleError {
    pub kind: ErrorKind,
    pub message: String,
    // Boxed to keep the error small on the happy path; most errors carry one or two entries
    pub context: Box<BTreeMap<String, String>>,
    pub inner: Option<Box<LocaleError>>,
}

/// Categories of localization failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or unreadable resource, including an exhausted fallback
    ResourceUnavailable,
    /// Invalid JSON or a missing/invalid `variables` member
    MalformedResource,
    /// Empty or unset locale where one is required
    InvalidLocale,
    /// Session or cookie store rejected a write
    PersistenceFailure,
    /// Lookup exhausted both the current and the default locale
    TranslationNotFound,
    /// Caller supplied an unusable argument (bad currency code, unknown locale tag)
    InvalidArgument,
    /// Formatting provider failed to produce output
    Formatting,
}

impl LocaleError {
    /// Create a new localization error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Box::default(),
            inner: None,
        }
    }

    pub fn resource_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceUnavailable, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedResource, message)
    }

    pub fn invalid_locale(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidLocale, message)
    }

    pub fn persistence(store: &str, key: &str) -> Self {
        Self::new(
            ErrorKind::PersistenceFailure,
            format!("Failed to set locale in {store}"),
        )
        .with_context("store", store)
        .with_context("key", key)
    }

    pub fn translation_not_found(key: &str) -> Self {
        Self::new(
            ErrorKind::TranslationNotFound,
            format!("Translation not found for key '{key}'"),
        )
        .with_context("key", key)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Add context information to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Chain this error with an inner error
    pub fn with_inner(mut self, inner: LocaleError) -> Self {
        self.inner = Some(Box::new(inner));
        self
    }

    /// Look up a context entry
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    /// Get the root cause of this error
    pub fn root_cause(&self) -> &LocaleError {
        let mut current = self;
        while let Some(ref inner) = current.inner {
            current = inner;
        }
        current
    }

    /// Structural failures are the ones gated by the error policy; a missing
    /// single translation is never structural.
    pub fn is_structural(&self) -> bool {
        !matches!(self.kind, ErrorKind::TranslationNotFound)
    }
}

impl fmt::Display for LocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;

        if !self.context.is_empty() {
            write!(f, " (")?;
            let mut first = true;
            for (key, value) in self.context.iter() {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: {value}")?;
                first = false;
            }
            write!(f, ")")?;
        }

        if let Some(ref inner) = self.inner {
            write!(f, "\nCaused by: {inner}")?;
        }

        Ok(())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::ResourceUnavailable => "Resource unavailable",
            ErrorKind::MalformedResource => "Malformed resource",
            ErrorKind::InvalidLocale => "Invalid locale",
            ErrorKind::PersistenceFailure => "Persistence failure",
            ErrorKind::TranslationNotFound => "Translation not found",
            ErrorKind::InvalidArgument => "Invalid argument",
            ErrorKind::Formatting => "Formatting error",
        };
        f.write_str(label)
    }
}

impl std::error::Error for LocaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.as_ref().map(|e| e as &dyn std::error::Error)
    }
}

impl From<std::io::Error> for LocaleError {
    fn from(err: std::io::Error) -> Self {
        LocaleError::resource_unavailable(format!("I/O error: {err}"))
    }
}

// Enable `?` on serde_json parsing without manual mapping
impl From<serde_json::Error> for LocaleError {
    fn from(err: serde_json::Error) -> Self {
        LocaleError::malformed(format!("Invalid JSON: {err}"))
            .with_context("line", err.line().to_string())
            .with_context("column", err.column().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_message_and_context() {
        let err = LocaleError::resource_unavailable("Locale file not found: /x/fr.json")
            .with_context("locale", "fr");
        let text = err.to_string();
        assert!(text.starts_with("Resource unavailable: Locale file not found"));
        assert!(text.contains("locale: fr"));
    }

    #[test]
    fn inner_error_is_chained() {
        let inner = LocaleError::malformed("Invalid JSON: expected value");
        let outer = LocaleError::resource_unavailable("load failed").with_inner(inner);
        assert_eq!(outer.root_cause().kind, ErrorKind::MalformedResource);
        assert!(outer.to_string().contains("Caused by: Malformed resource"));
        assert!(std::error::Error::source(&outer).is_some());
    }

    #[test]
    fn serde_json_errors_map_to_malformed() {
        let err: LocaleError = serde_json::from_str::<serde_json::Value>("{invalid json}")
            .unwrap_err()
            .into();
        assert_eq!(err.kind, ErrorKind::MalformedResource);
        assert_eq!(err.context_value("line"), Some("1"));
    }

    #[test]
    fn missing_translation_is_not_structural() {
        assert!(!LocaleError::translation_not_found("k").is_structural());
        assert!(LocaleError::persistence("session", "locale").is_structural());
    }
}
