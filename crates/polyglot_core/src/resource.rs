//! JSON translation resources: locating, reading and parsing.
//!
//! A resource is a JSON object with a required `variables` object and any
//! number of string members. Loading substitutes the variables into every
//! string member and keeps only the string-to-string pairs.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::cache::Translations;
use crate::config::LocaleConfig;
use crate::error::{LocaleError, LocaleResult};
use crate::substitution::{VariablePattern, Variables};

/// Name of the member holding substitution variables
pub const VARIABLES_KEY: &str = "variables";

/// Where raw resource bytes come from.
pub trait ResourceSource: Send {
    /// Human readable location of `locale`'s resource, used in messages
    fn describe(&self, locale: &str) -> String;

    /// Raw bytes for `locale`; `Ok(None)` when the resource does not exist
    fn read(&self, locale: &str) -> LocaleResult<Option<Vec<u8>>>;
}

/// Resources stored as files below a root directory
#[derive(Debug, Clone)]
pub struct FsResourceSource {
    root: Option<PathBuf>,
    path_template: String,
    extension: String,
}

impl FsResourceSource {
    pub fn new(root: Option<PathBuf>, path_template: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            root,
            path_template: path_template.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &LocaleConfig) -> Self {
        Self::new(
            config.resource_root.clone(),
            config.locale_path.clone(),
            config.file_extension.clone(),
        )
    }

    /// Physical path of `locale`'s resource.
    ///
    /// `{locale}` in the path template is replaced in place; otherwise the
    /// template is a directory and `<locale>.<ext>` is appended.
    pub fn path_for(&self, locale: &str) -> LocaleResult<PathBuf> {
        let root = self
            .root
            .as_ref()
            .filter(|root| !root.as_os_str().is_empty())
            .ok_or_else(|| LocaleError::resource_unavailable("Resource root is not set or is invalid"))?;

        if locale.is_empty() || locale.contains(['/', '\\']) || locale.contains("..") {
            return Err(LocaleError::invalid_locale(format!(
                "Locale '{locale}' cannot be mapped to a resource path"
            ))
            .with_context("locale", locale));
        }

        let relative = if self.path_template.contains("{locale}") {
            format!("{}.{}", self.path_template.replace("{locale}", locale), self.extension)
        } else {
            format!("{}{}.{}", self.path_template, locale, self.extension)
        };

        Ok(root.join(relative.trim_start_matches(['/', '\\'])))
    }
}

impl ResourceSource for FsResourceSource {
    fn describe(&self, locale: &str) -> String {
        match self.path_for(locale) {
            Ok(path) => path.display().to_string(),
            Err(_) => format!("{}{}.{}", self.path_template, locale, self.extension),
        }
    }

    fn read(&self, locale: &str) -> LocaleResult<Option<Vec<u8>>> {
        let path = self.path_for(locale)?;
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read(&path).map(Some).map_err(|e| {
            LocaleError::resource_unavailable(format!(
                "Failed to read locale file: {}: {e}",
                path.display()
            ))
            .with_context("path", path.display().to_string())
        })
    }
}

/// Resources held in memory, keyed by locale
#[derive(Debug, Clone, Default)]
pub struct MemoryResourceSource {
    documents: HashMap<String, Vec<u8>>,
}

impl MemoryResourceSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.documents.insert(locale.into(), content.into());
    }

    pub fn with(mut self, locale: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(locale, content);
        self
    }
}

impl ResourceSource for MemoryResourceSource {
    fn describe(&self, locale: &str) -> String {
        format!("memory:{locale}")
    }

    fn read(&self, locale: &str) -> LocaleResult<Option<Vec<u8>>> {
        Ok(self.documents.get(locale).cloned())
    }
}

/// Outcome of a successful load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedResource {
    /// Locale whose resource was actually read
    pub locale: String,
    pub translations: Translations,
}

impl LoadedResource {
    pub fn fell_back_from(&self, requested: &str) -> bool {
        self.locale != requested
    }
}

/// Reads and parses resources; never consults the cache.
pub struct ResourceLoader {
    source: Box<dyn ResourceSource>,
    default_locale: String,
    pattern: VariablePattern,
}

impl ResourceLoader {
    pub fn new(source: Box<dyn ResourceSource>, default_locale: impl Into<String>, pattern: VariablePattern) -> Self {
        Self {
            source,
            default_locale: default_locale.into(),
            pattern,
        }
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Load `locale`, falling back once to the default locale when its
    /// resource does not exist.
    pub fn load(&self, locale: &str) -> LocaleResult<LoadedResource> {
        let (actual, bytes) = match self.source.read(locale)? {
            Some(bytes) => (locale, bytes),
            None if locale != self.default_locale => {
                crate::polyglot_log_debug!(
                    locale,
                    fallback = %self.default_locale,
                    "locale resource missing, falling back to default"
                );
                match self.source.read(&self.default_locale)? {
                    Some(bytes) => (self.default_locale.as_str(), bytes),
                    None => return Err(self.not_found(&self.default_locale)),
                }
            }
            None => return Err(self.not_found(locale)),
        };

        let location = self.source.describe(actual);
        let translations = self.parse(&location, &bytes)?;
        crate::polyglot_log_debug!(locale = actual, entries = translations.len(), "loaded locale resource");

        Ok(LoadedResource {
            locale: actual.to_string(),
            translations,
        })
    }

    /// Parse one resource document. `location` only feeds error messages.
    pub fn parse(&self, location: &str, bytes: &[u8]) -> LocaleResult<Translations> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(LocaleError::resource_unavailable(format!(
                "Failed to read or empty locale file: {location}"
            ))
            .with_context("path", location));
        }

        let document: Value = serde_json::from_slice(bytes).map_err(|e| {
            LocaleError::malformed(format!("Invalid JSON in locale file: {location}"))
                .with_context("path", location)
                .with_inner(e.into())
        })?;

        let object = match document {
            Value::Object(object) => object,
            _ => return Err(missing_variables(location)),
        };
        let variables = match object.get(VARIABLES_KEY) {
            Some(Value::Object(vars)) => sanitize_variables(vars),
            _ => return Err(missing_variables(location)),
        };

        Ok(object
            .into_iter()
            .filter(|(key, _)| key != VARIABLES_KEY)
            .filter_map(|(key, value)| match value {
                Value::String(text) => Some((key, self.pattern.substitute(&text, &variables))),
                _ => None,
            })
            .collect())
    }

    fn not_found(&self, locale: &str) -> LocaleError {
        LocaleError::resource_unavailable(format!(
            "Locale file not found: {}",
            self.source.describe(locale)
        ))
        .with_context("locale", locale)
    }
}

fn missing_variables(location: &str) -> LocaleError {
    LocaleError::malformed(format!(
        "Missing or invalid '{VARIABLES_KEY}' key in locale file: {location}"
    ))
    .with_context("path", location)
}

/// Scalars become their text form; null, arrays and objects become "".
fn sanitize_variables(vars: &Map<String, Value>) -> Variables {
    vars.iter()
        .map(|(key, value)| (key.clone(), scalar_to_string(value)))
        .collect()
}

pub(crate) fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const EN: &str = r#"{
        "variables": {"site_name": "Test Site", "company": "Acme Corp", "year": 2024, "beta": true, "nested": {"a": 1}},
        "welcome": "Welcome to {{site_name}}",
        "about": "About {{company}}",
        "footer": "(c) {{year}} beta={{beta}} [{{nested}}]",
        "count": 3,
        "menu": ["a", "b"]
    }"#;

    fn loader(source: MemoryResourceSource) -> ResourceLoader {
        ResourceLoader::new(Box::new(source), "en", VariablePattern::Default)
    }

    #[test]
    fn substitutes_variables_and_keeps_only_strings() {
        let loaded = loader(MemoryResourceSource::new().with("en", EN)).load("en").unwrap();
        let t = &loaded.translations;
        assert_eq!(loaded.locale, "en");
        assert_eq!(t.get("welcome").unwrap(), "Welcome to Test Site");
        assert_eq!(t.get("about").unwrap(), "About Acme Corp");
        assert_eq!(t.get("footer").unwrap(), "(c) 2024 beta=true []");
        assert!(!t.contains_key("variables"));
        assert!(!t.contains_key("count"));
        assert!(!t.contains_key("menu"));
    }

    #[test]
    fn missing_locale_falls_back_to_default() {
        let loaded = loader(MemoryResourceSource::new().with("en", EN)).load("es").unwrap();
        assert_eq!(loaded.locale, "en");
        assert!(loaded.fell_back_from("es"));
    }

    #[test]
    fn missing_default_is_unavailable() {
        let err = loader(MemoryResourceSource::new()).load("es").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ResourceUnavailable);
        assert!(err.message.contains("memory:en"));
    }

    #[test]
    fn shape_errors_are_malformed() {
        let source = MemoryResourceSource::new()
            .with("bad", "{invalid json}")
            .with("arr", "[1, 2]")
            .with("novars", r#"{"welcome": "hi"}"#)
            .with("strvars", r#"{"variables": "nope"}"#);
        let l = loader(source);
        for locale in ["bad", "arr", "novars", "strvars"] {
            assert_eq!(l.load(locale).unwrap_err().kind, ErrorKind::MalformedResource, "{locale}");
        }
    }

    #[test]
    fn blank_resource_is_unavailable() {
        let err = loader(MemoryResourceSource::new().with("en", " \n\t")).load("en").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ResourceUnavailable);
        assert!(err.message.contains("empty"));
    }

    #[test]
    fn fs_paths_follow_the_template() {
        let source = FsResourceSource::new(Some(PathBuf::from("/srv/www")), "/locales/", "json");
        assert_eq!(source.path_for("fr").unwrap(), PathBuf::from("/srv/www/locales/fr.json"));

        let source = FsResourceSource::new(Some(PathBuf::from("/srv")), "i18n/{locale}/messages", "json");
        assert_eq!(source.path_for("de").unwrap(), PathBuf::from("/srv/i18n/de/messages.json"));
    }

    #[test]
    fn fs_source_requires_a_root() {
        let source = FsResourceSource::new(None, "/locales/", "json");
        assert_eq!(source.read("en").unwrap_err().kind, ErrorKind::ResourceUnavailable);
    }

    #[test]
    fn fs_source_rejects_traversal() {
        let source = FsResourceSource::new(Some(PathBuf::from("/srv")), "/locales/", "json");
        assert_eq!(source.path_for("../etc/passwd").unwrap_err().kind, ErrorKind::InvalidLocale);
    }

    #[test]
    fn fs_source_reads_existing_and_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("locales")).unwrap();
        std::fs::write(dir.path().join("locales/en.json"), EN).unwrap();
        let source = FsResourceSource::new(Some(dir.path().to_path_buf()), "/locales/", "json");
        assert!(source.read("en").unwrap().is_some());
        assert!(source.read("fr").unwrap().is_none());
    }
}
