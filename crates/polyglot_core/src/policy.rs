//! Strict/permissive handling of structural failures.

use serde::{Deserialize, Serialize};

use crate::error::LocaleResult;

/// How structural failures (bad resources, bad locales, failed persistence)
/// are surfaced.
///
/// `Strict` raises every failure to the caller; `Permissive` logs it and lets
/// the caller continue with a safe default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    Strict,
    #[default]
    Permissive,
}

impl ErrorPolicy {
    /// Map the `debug` configuration flag onto a policy
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            ErrorPolicy::Strict
        } else {
            ErrorPolicy::Permissive
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, ErrorPolicy::Strict)
    }

    /// Apply the policy to a fallible result.
    ///
    /// `Ok(Some(v))` on success, `Ok(None)` when a failure was swallowed.
    pub fn gate<T>(self, result: LocaleResult<T>) -> LocaleResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.is_strict() => Err(err),
            Err(err) => {
                crate::polyglot_log_warn!(kind = %err.kind, "suppressed: {}", err.message);
                Ok(None)
            }
        }
    }
}
