//! Error types for when-engine operations.
//!
//! Parsing itself never fails: text without a recognizable expression simply
//! yields no results. Errors only come from building a locale (a dictionary
//! or fragment that does not compile) and from constructing a reference
//! instant out of strings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WhenError {
    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),
}

impl WhenError {
    pub(crate) fn pattern(name: &str, err: impl std::fmt::Display) -> Self {
        WhenError::InvalidPattern {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WhenError>;
