//! Polyglot Core Library
//!
//! Request-scoped localization: resolves the active locale from session,
//! cookie and `Accept-Language` signals, loads JSON translation resources,
//! substitutes `{{variable}}` placeholders, selects plural forms and formats
//! numbers, currency and dates for the active locale.
//!
//! ```no_run
//! use polyglot_core::{LocaleConfig, Localizer, RequestSignals};
//!
//! let config = LocaleConfig::default()
//!     .with_supported_locales(["en", "fr"])
//!     .with_resource_root("/srv/app");
//! let mut l10n = Localizer::builder(config)
//!     .request(RequestSignals::new().with_accept_language("fr-FR,fr;q=0.9"))
//!     .build()?;
//! println!("{}", l10n.t("welcome"));
//! println!("{}", l10n.translate_plural("items", 3, &polyglot_core::vars! { "place" => "cart" })?);
//! # Ok::<(), polyglot_core::LocaleError>(())
//! ```

pub use cache::{LoadedResources, Translations};
pub use config::{ConfigError, LocaleConfig};
pub use error::{ErrorKind, LocaleError, LocaleResult};
pub use format::{BasicFormatter, DateStyle, FormattingProvider, FormattingRules};
pub use localizer::{EscapeMode, Localizer, LocalizerBuilder, LocalizerInfo, MISSING_PREFIX, PLURAL_NOT_FOUND};
pub use plural::PluralRuleTable;
pub use policy::ErrorPolicy;
pub use request::RequestSignals;
pub use resolver::{LocaleResolver, SupportedLocales};
pub use resource::{FsResourceSource, LoadedResource, MemoryResourceSource, ResourceLoader, ResourceSource};
pub use sanitize::{AllowedTags, Sanitizer, TagStripper};
pub use shared::SharedLocalizer;
pub use store::{MemoryStore, PreferenceStore};
pub use substitution::{VariablePattern, Variables};

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod localizer;
#[cfg(feature = "logging")]
pub mod logging;
pub mod plural;
pub mod policy;
pub mod request;
pub mod resolver;
pub mod resource;
pub mod sanitize;
pub mod shared;
pub mod store;
pub mod substitution;

#[doc(hidden)]
pub use tracing as __tracing;

/// Build a [`Variables`] map: `vars! { "name" => "Ada", "n" => 3 }`
#[macro_export]
macro_rules! vars {
    () => { $crate::Variables::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Variables::new();
        $( map.insert(::std::string::ToString::to_string(&$key), ::std::string::ToString::to_string(&$value)); )+
        map
    }};
}

// Logging facade macros: call sites stay, `minimal-logging` strips them
#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! polyglot_log_debug { ($($tt:tt)*) => { /* stripped in minimal build */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! polyglot_log_debug { ($($tt:tt)*) => { $crate::__tracing::debug!($($tt)*); }; }

#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! polyglot_log_info { ($($tt:tt)*) => { /* stripped */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! polyglot_log_info { ($($tt:tt)*) => { $crate::__tracing::info!($($tt)*); }; }

#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! polyglot_log_warn { ($($tt:tt)*) => { /* stripped */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! polyglot_log_warn { ($($tt:tt)*) => { $crate::__tracing::warn!($($tt)*); }; }

#[cfg(feature = "minimal-logging")]
#[macro_export]
macro_rules! polyglot_log_error { ($($tt:tt)*) => { /* stripped */ }; }
#[cfg(not(feature = "minimal-logging"))]
#[macro_export]
macro_rules! polyglot_log_error { ($($tt:tt)*) => { $crate::__tracing::error!($($tt)*); }; }
