//! Locale-aware number, currency and date formatting with light dependencies.
//! Avoids ICU: separators come from `num-format`'s CLDR tables, date patterns
//! and month names from small per-language tables.

use chrono::{Datelike, NaiveDate};
use num_format::{Grouping, Locale as NumLocale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{ErrorKind, LocaleError, LocaleResult};

/// Fraction digits beyond this are rounded away
pub const MAX_FRACTION_DIGITS: usize = 20;

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency code pattern compiles"));

/// Date rendering length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateStyle {
    Short,
    Medium,
    #[default]
    Long,
    Full,
}

impl DateStyle {
    /// Case-insensitive; anything unrecognised means `Long`
    pub fn parse_lenient(style: &str) -> Self {
        match style.trim().to_ascii_lowercase().as_str() {
            "short" => DateStyle::Short,
            "medium" => DateStyle::Medium,
            "full" => DateStyle::Full,
            _ => DateStyle::Long,
        }
    }
}

/// Numeric conventions of a locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattingRules {
    pub decimal_point: String,
    pub thousands_sep: String,
    pub minus_sign: String,
    pub grouping: &'static str,
}

/// Locale-aware formatting backend
pub trait FormattingProvider: Send {
    fn format_number(&self, locale: &str, value: f64, max_fraction_digits: usize) -> LocaleResult<String>;

    fn format_currency(&self, locale: &str, amount: f64, iso_code: &str, show_symbol: bool) -> LocaleResult<String>;

    fn format_date(&self, locale: &str, date: NaiveDate, style: DateStyle) -> LocaleResult<String>;

    /// `None` when the locale tag is unknown to the provider
    fn formatting_rules(&self, locale: &str) -> Option<FormattingRules>;
}

/// Reject anything that is not an upper-case ISO 4217 code
pub fn validate_currency_code(code: &str) -> LocaleResult<()> {
    if CURRENCY_CODE.is_match(code) {
        Ok(())
    } else {
        Err(LocaleError::invalid_argument("Invalid ISO 4217 currency code").with_context("currency", code))
    }
}

/// Default provider backed by `num-format` and `chrono`
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicFormatter;

impl FormattingProvider for BasicFormatter {
    fn format_number(&self, locale: &str, value: f64, max_fraction_digits: usize) -> LocaleResult<String> {
        let loc = num_locale(locale).unwrap_or(NumLocale::en);
        format_decimal(value, max_fraction_digits, &loc, true)
    }

    fn format_currency(&self, locale: &str, amount: f64, iso_code: &str, show_symbol: bool) -> LocaleResult<String> {
        validate_currency_code(iso_code)?;
        let loc = num_locale(locale).unwrap_or(NumLocale::en);
        let number = format_decimal(amount.abs(), currency_digits(iso_code), &loc, false)?;
        let sign = if amount < 0.0 && number.chars().any(|c| c.is_ascii_digit() && c != '0') {
            loc.minus_sign()
        } else {
            ""
        };

        let symbol = match (show_symbol, currency_symbol(iso_code)) {
            (true, Some(symbol)) => symbol,
            _ => iso_code,
        };
        let spaced = !show_symbol || symbol.chars().all(|c| c.is_ascii_alphabetic());

        let formatted = if symbol_first(&lang_code(locale)) {
            if spaced {
                format!("{sign}{symbol}\u{a0}{number}")
            } else {
                format!("{sign}{symbol}{number}")
            }
        } else {
            format!("{sign}{number}\u{a0}{symbol}")
        };
        Ok(formatted)
    }

    fn format_date(&self, locale: &str, date: NaiveDate, style: DateStyle) -> LocaleResult<String> {
        Ok(format_date_locale(date, style, &lang_code(locale)))
    }

    fn formatting_rules(&self, locale: &str) -> Option<FormattingRules> {
        let loc = num_locale(locale)?;
        let grouping = match loc.grouping() {
            Grouping::Standard => "standard",
            Grouping::Indian => "indian",
            Grouping::Posix => "posix",
        };
        Some(FormattingRules {
            decimal_point: loc.decimal().to_string(),
            thousands_sep: loc.separator().to_string(),
            minus_sign: loc.minus_sign().to_string(),
            grouping,
        })
    }
}

// Extract primary language subtag in lowercase from a BCP47-ish string.
// Examples: "ja-JP" -> "ja", "pt_BR" -> "pt", "EN" -> "en".
fn lang_code(langid: &str) -> String {
    let lower = langid.to_ascii_lowercase();
    let mut it = lower.split(['-', '_', '.']);
    it.next().unwrap_or("en").to_string()
}

// Full tag first ("fr-CA"), then the bare language ("fr").
fn num_locale(langid: &str) -> Option<NumLocale> {
    let tag = langid.split('.').next().unwrap_or(langid).replace('_', "-");
    NumLocale::from_name(&tag)
        .or_else(|_| NumLocale::from_name(lang_code(langid)))
        .ok()
}

fn format_decimal(value: f64, max_fraction_digits: usize, loc: &NumLocale, trim: bool) -> LocaleResult<String> {
    if !value.is_finite() {
        return Err(LocaleError::new(ErrorKind::Formatting, format!("Cannot format non-finite number {value}")));
    }

    let fixed = format!("{:.*}", max_fraction_digits.min(MAX_FRACTION_DIGITS), value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = if trim { frac_part.trim_end_matches('0') } else { frac_part };

    let grouped = match int_part.parse::<u128>() {
        Ok(n) => n.to_formatted_string(loc),
        // beyond u128: leave ungrouped
        Err(_) => int_part.to_string(),
    };

    let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.bytes().all(|b| b == b'0');
    let sign = if value < 0.0 && !is_zero { loc.minus_sign() } else { "" };

    if frac_part.is_empty() {
        Ok(format!("{sign}{grouped}"))
    } else {
        Ok(format!("{sign}{grouped}{}{frac_part}", loc.decimal()))
    }
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "INR" => "₹",
        "KRW" => "₩",
        "RUB" => "₽",
        "BRL" => "R$",
        "CAD" => "CA$",
        "AUD" => "A$",
        _ => return None,
    };
    Some(symbol)
}

fn currency_digits(code: &str) -> usize {
    match code {
        "JPY" | "KRW" => 0,
        _ => 2,
    }
}

fn symbol_first(lang: &str) -> bool {
    matches!(lang, "en" | "ja" | "zh" | "ko")
}

struct DateNames {
    months: [&'static str; 12],
    months_short: [&'static str; 12],
    // Monday first
    weekdays: [&'static str; 7],
}

const EN_NAMES: DateNames = DateNames {
    months: [
        "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
        "November", "December",
    ],
    months_short: ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
    weekdays: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
};

const FR_NAMES: DateNames = DateNames {
    months: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre", "octobre",
        "novembre", "décembre",
    ],
    months_short: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.", "déc.",
    ],
    weekdays: ["lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche"],
};

const DE_NAMES: DateNames = DateNames {
    months: [
        "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September", "Oktober",
        "November", "Dezember",
    ],
    months_short: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.", "Dez.",
    ],
    weekdays: ["Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag"],
};

const ES_NAMES: DateNames = DateNames {
    months: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre", "octubre",
        "noviembre", "diciembre",
    ],
    months_short: ["ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic"],
    weekdays: ["lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo"],
};

const JA_WEEKDAYS: [&str; 7] = ["月曜日", "火曜日", "水曜日", "木曜日", "金曜日", "土曜日", "日曜日"];

fn format_date_locale(date: NaiveDate, style: DateStyle, lang: &str) -> String {
    let (y, m, d) = (date.year(), date.month(), date.day());
    let mi = m as usize - 1;
    let wi = date.weekday().num_days_from_monday() as usize;
    let yy = y.rem_euclid(100);

    match lang {
        "fr" => match style {
            DateStyle::Short => format!("{d:02}/{m:02}/{y}"),
            DateStyle::Medium => format!("{d} {} {y}", FR_NAMES.months_short[mi]),
            DateStyle::Long => format!("{d} {} {y}", FR_NAMES.months[mi]),
            DateStyle::Full => format!("{} {d} {} {y}", FR_NAMES.weekdays[wi], FR_NAMES.months[mi]),
        },
        "de" => match style {
            DateStyle::Short => format!("{d:02}.{m:02}.{yy:02}"),
            DateStyle::Medium => format!("{d:02}.{m:02}.{y}"),
            DateStyle::Long => format!("{d}. {} {y}", DE_NAMES.months[mi]),
            DateStyle::Full => format!("{}, {d}. {} {y}", DE_NAMES.weekdays[wi], DE_NAMES.months[mi]),
        },
        "es" => match style {
            DateStyle::Short => format!("{d}/{m}/{yy:02}"),
            DateStyle::Medium => format!("{d} {} {y}", ES_NAMES.months_short[mi]),
            DateStyle::Long => format!("{d} de {} de {y}", ES_NAMES.months[mi]),
            DateStyle::Full => format!("{}, {d} de {} de {y}", ES_NAMES.weekdays[wi], ES_NAMES.months[mi]),
        },
        "ja" => match style {
            DateStyle::Short | DateStyle::Medium => format!("{y}/{m:02}/{d:02}"),
            DateStyle::Long => format!("{y}年{m}月{d}日"),
            DateStyle::Full => format!("{y}年{m}月{d}日{}", JA_WEEKDAYS[wi]),
        },
        _ => match style {
            DateStyle::Short => format!("{m}/{d}/{yy:02}"),
            DateStyle::Medium => format!("{} {d}, {y}", EN_NAMES.months_short[mi]),
            DateStyle::Long => format!("{} {d}, {y}", EN_NAMES.months[mi]),
            DateStyle::Full => format!("{}, {} {d}, {y}", EN_NAMES.weekdays[wi], EN_NAMES.months[mi]),
        },
    }
}
