//! Entity decoding and tag stripping for rendered translations.
//!
//! This is output tidying for trusted resource files, not an HTML security
//! boundary.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z]+);").expect("entity pattern compiles")
});

static MARKUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("tag pattern compiles")
});

/// Lower-case tag names that survive sanitizing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedTags {
    names: HashSet<String>,
}

impl AllowedTags {
    /// Parse the `<a><br>` configuration form. Anything outside angle brackets is ignored.
    pub fn parse(tags: &str) -> Self {
        let names = tags
            .split('<')
            .filter_map(|part| part.split_once('>'))
            .map(|(name, _)| name.trim().trim_start_matches('/').to_ascii_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    pub fn allows(&self, tag: &str) -> bool {
        self.names.contains(&tag.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Cleans translated text before it is handed to the caller
pub trait Sanitizer: Send {
    fn sanitize(&self, input: &str, allowed: &AllowedTags) -> String;
}

/// Decodes HTML entities, then removes every tag not in the allow list.
///
/// Numeric references (`&#233;`, `&#xE9;`) decode in full, but only a small
/// set of named entities is known: `amp`, `lt`, `gt`, `quot`, `apos`, `nbsp`,
/// `copy`, `reg`, `hellip`, `ndash`, `mdash` and `euro`. Other named entities
/// pass through untouched. Inject a custom [`Sanitizer`] for the complete
/// HTML5 entity table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagStripper;

impl Sanitizer for TagStripper {
    fn sanitize(&self, input: &str, allowed: &AllowedTags) -> String {
        let decoded = decode_entities(input);
        MARKUP
            .replace_all(&decoded, |caps: &Captures| match caps.get(1) {
                Some(name) if allowed.allows(name.as_str()) => caps[0].to_string(),
                _ => String::new(),
            })
            .into_owned()
    }
}

/// Decode numeric and the known named entities; see [`TagStripper`]
pub fn decode_entities(input: &str) -> String {
    ENTITY
        .replace_all(input, |caps: &Captures| {
            decode_entity(&caps[1]).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "hellip" => '…',
        "ndash" => '–',
        "mdash" => '—',
        "euro" => '€',
        _ => return None,
    };
    Some(c)
}
