//! Per-request locale signals.

/// Locale hints carried by the current request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSignals {
    /// Explicit override, e.g. a `?locale=fr` query parameter
    pub locale_param: Option<String>,
    /// Raw `Accept-Language` header value
    pub accept_language: Option<String>,
}

impl RequestSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale_param(mut self, locale: impl Into<String>) -> Self {
        self.locale_param = Some(locale.into());
        self
    }

    pub fn with_accept_language(mut self, header: impl Into<String>) -> Self {
        self.accept_language = Some(header.into());
        self
    }

    /// Override parameter, ignoring empty values
    pub fn override_param(&self) -> Option<&str> {
        self.locale_param.as_deref().filter(|l| !l.is_empty())
    }
}

/// Candidate language codes from an `Accept-Language` value, in header order.
///
/// Each entry is cut at `;`, trimmed, lower-cased and truncated to its first
/// two characters. Quality values are not used for ordering.
pub fn accept_language_codes(header: &str) -> impl Iterator<Item = String> + '_ {
    header.split(',').filter_map(|entry| {
        let tag = entry.split(';').next().unwrap_or_default().trim();
        if tag.is_empty() {
            return None;
        }
        Some(tag.chars().take(2).collect::<String>().to_lowercase())
    })
}
