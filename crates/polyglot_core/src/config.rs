//! Localizer configuration.
//!
//! `LocaleConfig` is plain data: it can be built in code, deserialized from
//! TOML, and is validated once before a [`Localizer`](crate::Localizer) is
//! constructed from it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::policy::ErrorPolicy;
use crate::substitution::{VariablePattern, DEFAULT_PATTERN};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid variable pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Default locale must not be empty")]
    EmptyDefaultLocale,

    #[error("Supported locale list contains an empty entry")]
    EmptySupportedLocale,

    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Constructor-time configuration, all fields defaulted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Tags kept by the sanitizer, written as `<a><br>`
    pub allowed_tags: String,
    /// Strict error policy when true
    pub debug: bool,
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    /// Directory template appended to the resource root; may contain `{locale}`
    pub locale_path: String,
    pub file_extension: String,
    pub session_enabled: bool,
    pub session_key: String,
    pub cookie_enabled: bool,
    pub cookie_key: String,
    pub cookie_ttl_secs: u64,
    /// Placeholder regex; empty disables substitution
    pub variable_pattern: String,
    /// Locale -> suffix used when count == 1
    pub plural_rules: HashMap<String, String>,
    /// Root directory resources are resolved against
    pub resource_root: Option<PathBuf>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            allowed_tags: "<a><br>".to_string(),
            debug: false,
            default_locale: "en".to_string(),
            supported_locales: vec!["en".to_string()],
            locale_path: "/locales/".to_string(),
            file_extension: "json".to_string(),
            session_enabled: true,
            session_key: "locale".to_string(),
            cookie_enabled: false,
            cookie_key: "site_locale".to_string(),
            cookie_ttl_secs: 86_400 * 30,
            variable_pattern: DEFAULT_PATTERN.to_string(),
            plural_rules: HashMap::new(),
            resource_root: None,
        }
    }
}

impl LocaleConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LocaleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject values that cannot produce a working localizer
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_locale.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultLocale);
        }
        if self.supported_locales.iter().any(|l| l.trim().is_empty()) {
            return Err(ConfigError::EmptySupportedLocale);
        }
        self.pattern()?;
        Ok(())
    }

    pub fn policy(&self) -> ErrorPolicy {
        ErrorPolicy::from_debug(self.debug)
    }

    pub fn pattern(&self) -> Result<VariablePattern, ConfigError> {
        VariablePattern::parse(Some(&self.variable_pattern))
    }

    pub fn cookie_ttl(&self) -> Duration {
        Duration::from_secs(self.cookie_ttl_secs)
    }

    pub fn with_default_locale(mut self, locale: impl Into<String>) -> Self {
        self.default_locale = locale.into();
        self
    }

    pub fn with_supported_locales<I, S>(mut self, locales: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_locales = locales.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resource_root = Some(root.into());
        self
    }

    pub fn with_locale_path(mut self, path: impl Into<String>) -> Self {
        self.locale_path = path.into();
        self
    }

    pub fn with_session(mut self, enabled: bool) -> Self {
        self.session_enabled = enabled;
        self
    }

    pub fn with_cookie(mut self, enabled: bool) -> Self {
        self.cookie_enabled = enabled;
        self
    }

    pub fn with_allowed_tags(mut self, tags: impl Into<String>) -> Self {
        self.allowed_tags = tags.into();
        self
    }

    pub fn with_variable_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.variable_pattern = pattern.into();
        self
    }

    pub fn with_plural_rule(mut self, locale: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.plural_rules.insert(locale.into(), suffix.into());
        self
    }
}
