//! Placeholder substitution for translation strings.
//!
//! The default `{{name}}` placeholder goes through a literal scanner; custom
//! patterns go through the regex engine. Both tiers give the same output for
//! the default pattern, which the property tests in `tests/substitution_props.rs`
//! check on arbitrary input.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::config::ConfigError;

/// Variable name to replacement text
pub type Variables = HashMap<String, String>;

/// Textual form of the default placeholder pattern as it appears in configuration
pub const DEFAULT_PATTERN: &str = "{{(.*?)}}";

const DEFAULT_PATTERN_ESCAPED: &str = r"\{\{(.*?)\}\}";

static DEFAULT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_PATTERN_ESCAPED).expect("default placeholder pattern compiles"));

/// Compiled default placeholder regex, for callers that want the generic tier
pub fn default_regex() -> &'static Regex {
    &DEFAULT_REGEX
}

/// Placeholder recognition strategy
#[derive(Clone, Default)]
pub enum VariablePattern {
    /// `{{identifier}}`, handled by the literal scanner
    #[default]
    Default,
    /// Any regex; capture group 1 is the identifier (whole match without a group)
    Custom(Regex),
    /// No substitution at all
    Disabled,
}

impl VariablePattern {
    /// Build a pattern from configuration text.
    ///
    /// `None` or an empty string disables substitution. Both the configuration
    /// form `{{(.*?)}}` and its escaped regex form select the default scanner.
    pub fn parse(pattern: Option<&str>) -> Result<Self, ConfigError> {
        match pattern.map(str::trim) {
            None | Some("") => Ok(VariablePattern::Disabled),
            Some(DEFAULT_PATTERN) | Some(DEFAULT_PATTERN_ESCAPED) => Ok(VariablePattern::Default),
            Some(custom) => Regex::new(custom)
                .map(VariablePattern::Custom)
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: custom.to_string(),
                    reason: e.to_string(),
                }),
        }
    }

    /// Configuration text for this pattern, `None` when disabled
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VariablePattern::Default => Some(DEFAULT_PATTERN),
            VariablePattern::Custom(re) => Some(re.as_str()),
            VariablePattern::Disabled => None,
        }
    }

    /// Replace every recognised placeholder whose identifier is bound in
    /// `variables`. Unbound placeholders are kept verbatim and replacement
    /// values are never rescanned.
    pub fn substitute(&self, template: &str, variables: &Variables) -> String {
        match self {
            VariablePattern::Default => substitute_literal(template, variables),
            VariablePattern::Custom(re) => substitute_generic(re, template, variables),
            VariablePattern::Disabled => template.to_string(),
        }
    }
}

impl fmt::Debug for VariablePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariablePattern::Default => f.write_str("Default"),
            VariablePattern::Custom(re) => f.debug_tuple("Custom").field(&re.as_str()).finish(),
            VariablePattern::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Generic tier: any regex, identifier taken from capture group 1.
pub fn substitute_generic(re: &Regex, template: &str, variables: &Variables) -> String {
    re.replace_all(template, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let ident = caps.get(1).map_or(whole, |m| m.as_str());
        match variables.get(ident) {
            Some(value) => value.clone(),
            None => whole.to_string(),
        }
    })
    .into_owned()
}

/// Literal tier for `{{identifier}}`.
///
/// Mirrors the leftmost-first, lazy semantics of `\{\{(.*?)\}\}`: the
/// identifier runs to the first `}}` and may not contain a newline. When the
/// first `}}` lies past a newline there is no match at this `{{`, and the
/// scan resumes one byte later exactly like the regex engine does.
pub fn substitute_literal(template: &str, variables: &Variables) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let body = &rest[open + 2..];
        let Some(close) = body.find("}}") else {
            break;
        };
        let ident = &body[..close];

        if ident.contains('\n') {
            // '{' is one byte, so this stays on a char boundary
            out.push_str(&rest[..open + 1]);
            rest = &rest[open + 1..];
            continue;
        }

        out.push_str(&rest[..open]);
        match variables.get(ident) {
            Some(value) => out.push_str(value),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &body[close + 2..];
    }

    out.push_str(rest);
    out
}
