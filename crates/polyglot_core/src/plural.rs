//! Plural-suffix selection.
//!
//! Only the "exactly one" form is configurable per locale; every other count
//! uses [`OTHER_SUFFIX`].

use std::collections::HashMap;

/// Suffix for count == 1 when the locale has no rule
pub const ONE_SUFFIX: &str = "_1";
/// Suffix for every count other than 1
pub const OTHER_SUFFIX: &str = "_other";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluralRuleTable {
    rules: HashMap<String, String>,
}

impl PluralRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: impl Into<String>, suffix: impl Into<String>) {
        self.rules.insert(locale.into(), suffix.into());
    }

    pub fn rule(&self, locale: &str) -> Option<&str> {
        self.rules.get(locale).map(String::as_str)
    }

    /// Suffix appended to a key for `count` items in `locale`
    pub fn suffix_for(&self, locale: &str, count: i64) -> &str {
        if count == 1 {
            self.rule(locale).unwrap_or(ONE_SUFFIX)
        } else {
            OTHER_SUFFIX
        }
    }

    /// `key` with the plural suffix for `count` appended
    pub fn plural_key(&self, key: &str, locale: &str, count: i64) -> String {
        format!("{key}{}", self.suffix_for(locale, count))
    }
}

impl From<HashMap<String, String>> for PluralRuleTable {
    fn from(rules: HashMap<String, String>) -> Self {
        Self { rules }
    }
}
