//! Request-scoped localizer: active locale, loaded resources and translation
//! lookup, plus locale-aware formatting through a [`FormattingProvider`].

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::cache::LoadedResources;
use crate::config::LocaleConfig;
use crate::error::{LocaleError, LocaleResult};
use crate::format::{validate_currency_code, BasicFormatter, DateStyle, FormattingProvider, FormattingRules};
use crate::plural::PluralRuleTable;
use crate::policy::ErrorPolicy;
use crate::request::RequestSignals;
use crate::resolver::{LocaleResolver, SupportedLocales};
use crate::resource::{FsResourceSource, ResourceLoader, ResourceSource};
use crate::sanitize::{AllowedTags, Sanitizer, TagStripper};
use crate::store::{MemoryStore, PreferenceStore};
use crate::substitution::{VariablePattern, Variables};

/// Rendered by [`Localizer::translate`] for an unknown key
pub const MISSING_PREFIX: &str = "Translation missing: ";
/// Rendered by [`Localizer::translate_plural`] when no plural form exists
pub const PLURAL_NOT_FOUND: &str = "Translation not found.";

/// Post-processing applied by [`Localizer::translate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapeMode {
    /// Decode entities and strip tags outside the allow list
    #[default]
    Sanitize,
    /// Stored text as is
    Raw,
}

/// Serializable snapshot of the localizer state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizerInfo {
    pub debug: bool,
    pub current_locale: Option<String>,
    pub default_locale: String,
    pub supported_locales: Vec<String>,
    pub locale_path: String,
    pub file_extension: String,
    pub loaded_locales: Vec<String>,
    pub allowed_tags: String,
    pub variable_pattern: Option<String>,
    pub session_enabled: bool,
    pub session_key: String,
    pub cookie_enabled: bool,
    pub cookie_key: String,
}

/// Builder for [`Localizer`]; every collaborator has a default
pub struct LocalizerBuilder {
    config: LocaleConfig,
    source: Option<Box<dyn ResourceSource>>,
    session: Option<Box<dyn PreferenceStore>>,
    cookie: Option<Box<dyn PreferenceStore>>,
    request: RequestSignals,
    formatter: Option<Box<dyn FormattingProvider>>,
    sanitizer: Option<Box<dyn Sanitizer>>,
    detect: bool,
}

impl LocalizerBuilder {
    fn new(config: LocaleConfig) -> Self {
        Self {
            config,
            source: None,
            session: None,
            cookie: None,
            request: RequestSignals::default(),
            formatter: None,
            sanitizer: None,
            detect: true,
        }
    }

    /// Where resources are read from (default: files below `resource_root`)
    pub fn resource_source(mut self, source: impl ResourceSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Session store, used only when `session_enabled`
    pub fn session_store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.session = Some(Box::new(store));
        self
    }

    /// Cookie store, used only when `cookie_enabled`
    pub fn cookie_store(mut self, store: impl PreferenceStore + 'static) -> Self {
        self.cookie = Some(Box::new(store));
        self
    }

    pub fn request(mut self, request: RequestSignals) -> Self {
        self.request = request;
        self
    }

    pub fn formatter(mut self, formatter: impl FormattingProvider + 'static) -> Self {
        self.formatter = Some(Box::new(formatter));
        self
    }

    pub fn sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Some(Box::new(sanitizer));
        self
    }

    /// Run locale detection while building (default: true)
    pub fn detect_on_build(mut self, detect: bool) -> Self {
        self.detect = detect;
        self
    }

    pub fn build(self) -> LocaleResult<Localizer> {
        let config = self.config;
        config
            .validate()
            .map_err(|e| LocaleError::invalid_argument(format!("Invalid configuration: {e}")))?;
        let pattern = config
            .pattern()
            .map_err(|e| LocaleError::invalid_argument(format!("Invalid configuration: {e}")))?;

        let source = self
            .source
            .unwrap_or_else(|| Box::new(FsResourceSource::from_config(&config)));
        let loader = ResourceLoader::new(source, config.default_locale.clone(), pattern.clone());

        let mut resolver = LocaleResolver::new(self.request);
        if config.session_enabled {
            let store = self.session.unwrap_or_else(|| Box::new(MemoryStore::new()));
            resolver = resolver.with_session(store, config.session_key.clone());
        }
        if config.cookie_enabled {
            let store = self.cookie.unwrap_or_else(|| Box::new(MemoryStore::new()));
            resolver = resolver.with_cookie(store, config.cookie_key.clone(), config.cookie_ttl());
        }

        let mut localizer = Localizer {
            policy: config.policy(),
            supported: SupportedLocales::new(config.supported_locales.iter().cloned()),
            plural_rules: PluralRuleTable::from(config.plural_rules.clone()),
            allowed_tags: AllowedTags::parse(&config.allowed_tags),
            current: None,
            cache: LoadedResources::new(),
            pattern,
            loader,
            resolver,
            formatter: self.formatter.unwrap_or_else(|| Box::new(BasicFormatter)),
            sanitizer: self.sanitizer.unwrap_or_else(|| Box::new(TagStripper)),
            config,
        };

        if self.detect {
            localizer.set_active(None, false)?;
        }
        Ok(localizer)
    }
}

/// Resolves the active locale and renders translations for it.
///
/// One instance serves one request scope. Structural failures are surfaced
/// according to the configured [`ErrorPolicy`]; missing translations always
/// render a sentinel string.
pub struct Localizer {
    config: LocaleConfig,
    policy: ErrorPolicy,
    pattern: VariablePattern,
    supported: SupportedLocales,
    current: Option<String>,
    cache: LoadedResources,
    loader: ResourceLoader,
    resolver: LocaleResolver,
    plural_rules: PluralRuleTable,
    allowed_tags: AllowedTags,
    formatter: Box<dyn FormattingProvider>,
    sanitizer: Box<dyn Sanitizer>,
}

impl Localizer {
    pub fn builder(config: LocaleConfig) -> LocalizerBuilder {
        LocalizerBuilder::new(config)
    }

    /// Build with default collaborators and detect the locale immediately
    pub fn new(config: LocaleConfig) -> LocaleResult<Self> {
        Self::builder(config).build()
    }

    /// Make `candidate` (or a detected locale) the active one.
    ///
    /// Without `force`, a missing or unsupported candidate is re-derived from
    /// the request override, session, cookie and header, ending at the
    /// default locale. The result is persisted and its resource autoloaded.
    /// Under the strict policy a failed store write is returned before the
    /// active locale changes.
    pub fn set_active(&mut self, candidate: Option<&str>, force: bool) -> LocaleResult<String> {
        let default = self.config.default_locale.clone();
        self.supported.insert(default.clone());

        let mut locale = match candidate {
            Some(c) if force || self.supported.contains(c) => c.to_string(),
            _ => self.resolver.rederive(&self.supported, &default),
        };
        if !force && !self.supported.contains(&locale) {
            locale = default;
        }
        if locale.trim().is_empty() {
            return Err(LocaleError::invalid_locale("Locale must be a non-empty string"));
        }

        // a strict failure leaves the previous locale active
        for failure in self.resolver.persist(&locale) {
            self.policy.gate::<()>(Err(failure))?;
        }

        self.current = Some(locale.clone());
        crate::polyglot_log_info!(locale = %locale, force, "active locale set");

        if !self.cache.contains(&locale) {
            self.load_locale(&locale)?;
        }
        Ok(locale)
    }

    /// Load (or reload) `locale`'s resource into the cache.
    ///
    /// Returns the locale that was actually cached, which is the default
    /// locale when `locale` has no resource; `None` when a failure was
    /// suppressed by the permissive policy.
    pub fn load_locale(&mut self, locale: &str) -> LocaleResult<Option<String>> {
        let Some(loaded) = self.policy.gate(self.loader.load(locale))? else {
            return Ok(None);
        };
        let actual = loaded.locale.clone();
        self.cache.insert(loaded.locale, loaded.translations);
        Ok(Some(actual))
    }

    /// Drop exactly `locale` from the cache
    pub fn unload(&mut self, locale: &str) -> LocaleResult<()> {
        if self.cache.remove(locale).is_some() {
            crate::polyglot_log_debug!(locale, "unloaded locale resource");
            return Ok(());
        }
        let err = LocaleError::resource_unavailable(format!(
            "Locale file {locale} is not currently loaded or has been already unloaded"
        ))
        .with_context("locale", locale);
        self.policy.gate::<()>(Err(err))?;
        Ok(())
    }

    /// Translation of `key` in the active locale, or `Translation missing: <key>`
    pub fn translate(&self, key: &str, mode: EscapeMode) -> String {
        let found = self
            .current
            .as_deref()
            .and_then(|locale| self.cache.lookup(locale, key));

        match (found, mode) {
            (Some(text), EscapeMode::Sanitize) => self.sanitizer.sanitize(text, &self.allowed_tags),
            (Some(text), EscapeMode::Raw) => text.to_string(),
            (None, _) => {
                crate::polyglot_log_debug!(key, locale = ?self.current, "translation missing");
                format!("{MISSING_PREFIX}{key}")
            }
        }
    }

    /// Shorthand for [`translate`](Self::translate) with sanitizing
    pub fn t(&self, key: &str) -> String {
        self.translate(key, EscapeMode::Sanitize)
    }

    /// Raw translation from the active locale, then the default locale
    pub fn lookup(&self, key: &str) -> LocaleResult<String> {
        self.current
            .as_deref()
            .and_then(|locale| self.cache.lookup(locale, key))
            .or_else(|| self.cache.lookup(&self.config.default_locale, key))
            .map(str::to_string)
            .ok_or_else(|| LocaleError::translation_not_found(key))
    }

    /// Plural form of `key` for `count`, with `count` and `vars` substituted.
    ///
    /// The default locale's resource is loaded if needed and a failure there
    /// is returned regardless of policy.
    pub fn translate_plural<V: ToString>(
        &mut self,
        key: &str,
        count: i64,
        vars: &HashMap<String, V>,
    ) -> LocaleResult<String> {
        let current = self.locale().to_string();
        let default = self.config.default_locale.clone();

        if !self.cache.contains(&current) {
            self.load_locale(&current)?;
        }
        if !self.cache.contains(&default) {
            let loaded = self.loader.load(&default)?;
            self.cache.insert(loaded.locale, loaded.translations);
        }

        let plural_key = self.plural_rules.plural_key(key, &current, count);
        let template = self
            .cache
            .lookup(&current, &plural_key)
            .or_else(|| self.cache.lookup(&default, &plural_key));

        let Some(template) = template else {
            crate::polyglot_log_warn!(key = %plural_key, locale = %current, "plural translation not found");
            return Ok(PLURAL_NOT_FOUND.to_string());
        };

        let mut variables: Variables = vars.iter().map(|(k, v)| (k.clone(), v.to_string())).collect();
        variables.insert("count".to_string(), count.to_string());
        Ok(self.pattern.substitute(template, &variables))
    }

    /// Active locale, or the default locale before one was set
    pub fn locale(&self) -> &str {
        self.current.as_deref().unwrap_or(&self.config.default_locale)
    }

    pub fn current_locale(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn supported_locales(&self) -> &SupportedLocales {
        &self.supported
    }

    pub fn loaded(&self) -> &LoadedResources {
        &self.cache
    }

    pub fn config(&self) -> &LocaleConfig {
        &self.config
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Replace the request signals used by later detection
    pub fn set_request(&mut self, request: RequestSignals) {
        self.resolver.set_request(request);
    }

    pub fn info(&self) -> LocalizerInfo {
        LocalizerInfo {
            debug: self.config.debug,
            current_locale: self.current.clone(),
            default_locale: self.config.default_locale.clone(),
            supported_locales: self.supported.as_slice().to_vec(),
            locale_path: self.config.locale_path.clone(),
            file_extension: self.config.file_extension.clone(),
            loaded_locales: self.cache.locales(),
            allowed_tags: self.config.allowed_tags.clone(),
            variable_pattern: self.pattern.as_str().map(str::to_string),
            session_enabled: self.resolver.session_enabled(),
            session_key: self.config.session_key.clone(),
            cookie_enabled: self.resolver.cookie_enabled(),
            cookie_key: self.config.cookie_key.clone(),
        }
    }

    /// Numeric conventions of the active locale
    pub fn formatting_rules(&self) -> LocaleResult<Option<FormattingRules>> {
        let locale = self.require_current()?;
        match self.formatter.formatting_rules(locale) {
            Some(rules) => Ok(Some(rules)),
            None => {
                let err = LocaleError::invalid_argument(format!("Invalid locale: {locale}"))
                    .with_context("locale", locale);
                self.policy.gate::<FormattingRules>(Err(err))
            }
        }
    }

    pub fn format_number(&self, value: f64, max_fraction_digits: usize) -> LocaleResult<String> {
        let locale = self.require_current()?;
        self.formatter.format_number(locale, value, max_fraction_digits)
    }

    pub fn format_currency(&self, amount: f64, currency: &str, show_symbol: bool) -> LocaleResult<String> {
        let locale = self.require_current()?;
        validate_currency_code(currency)?;
        self.formatter.format_currency(locale, amount, currency, show_symbol)
    }

    pub fn format_date(&self, date: NaiveDate, style: DateStyle) -> LocaleResult<String> {
        let locale = self.require_current()?;
        self.formatter.format_date(locale, date, style)
    }

    fn require_current(&self) -> LocaleResult<&str> {
        self.current
            .as_deref()
            .ok_or_else(|| LocaleError::invalid_locale("Current locale is not set"))
    }
}

#[cfg(test)]
mod tests;
