#![forbid(unsafe_code)]

//! Configuration for the history engine.
//!
//! [`HistoryConfig`] carries the eviction bound for the history record. It is
//! built fluently in code or, with the `config` feature, loaded from TOML or
//! JSON at startup.
//!
//! # Loading
//!
//! ```toml
//! # rewind.toml
//! max_history = 200
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::from_toml_file("rewind.toml")?;
//! let config = HistoryConfig::from_json_str(r#"{ "max_history": 200 }"#)?;
//! ```
//!
//! # Defaults
//!
//! `HistoryConfig::default()` is unbounded: the record keeps every executed
//! operation until [`History::clear`](crate::History::clear) is called.

use std::fmt;
use std::num::NonZeroUsize;
#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

/// Configuration for the history engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct HistoryConfig {
    /// Maximum number of operations kept in the record (`None` = unbounded).
    /// The oldest applied operation is evicted when the bound is exceeded.
    pub max_history: Option<NonZeroUsize>,
}

impl HistoryConfig {
    /// Create an unbounded configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unbounded configuration.
    #[must_use]
    pub fn unlimited() -> Self {
        Self { max_history: None }
    }

    /// Set the eviction bound.
    #[must_use]
    pub fn with_max_history(mut self, max_history: NonZeroUsize) -> Self {
        self.max_history = Some(max_history);
        self
    }

    /// Set the eviction bound from a plain count.
    ///
    /// Fails validation when `max_history` is zero.
    pub fn try_with_max_history(self, max_history: usize) -> Result<Self, HistoryConfigError> {
        NonZeroUsize::new(max_history)
            .map(|n| self.with_max_history(n))
            .ok_or_else(|| {
                HistoryConfigError::Validation(vec!["max_history must be > 0".into()])
            })
    }

    /// The eviction bound as a plain count (`usize::MAX` when unbounded).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max_history.map_or(usize::MAX, NonZeroUsize::get)
    }

    /// Check whether the record is bounded.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.max_history.is_some()
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, HistoryConfigError> {
        toml::from_str(s).map_err(HistoryConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, HistoryConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(HistoryConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, HistoryConfigError> {
        serde_json::from_str(s).map_err(HistoryConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, HistoryConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(HistoryConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Serialize to a TOML string.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, HistoryConfigError> {
        toml::to_string_pretty(self).map_err(HistoryConfigError::TomlSer)
    }
}

/// Errors from loading a [`HistoryConfig`].
#[derive(Debug)]
pub enum HistoryConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// TOML serialization error.
    #[cfg(feature = "config")]
    TomlSer(toml::ser::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for HistoryConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => write!(f, "TOML serialize error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for HistoryConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::TomlSer(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_history, None);
        assert!(!config.is_bounded());
        assert_eq!(config.capacity(), usize::MAX);
        assert_eq!(config, HistoryConfig::unlimited());
        assert_eq!(config, HistoryConfig::new());
    }

    #[test]
    fn test_with_max_history() {
        let config = HistoryConfig::new().with_max_history(NonZeroUsize::new(2).unwrap());
        assert!(config.is_bounded());
        assert_eq!(config.capacity(), 2);
    }

    #[test]
    fn test_try_with_max_history_rejects_zero() {
        let err = HistoryConfig::new().try_with_max_history(0).unwrap_err();
        assert!(matches!(err, HistoryConfigError::Validation(_)));
        assert!(err.to_string().contains("max_history must be > 0"));

        let config = HistoryConfig::new().try_with_max_history(7).unwrap();
        assert_eq!(config.capacity(), 7);
    }

    #[cfg(feature = "config")]
    mod loading {
        use crate::config::{HistoryConfig, HistoryConfigError};
        use std::io::Write;
        use std::num::NonZeroUsize;

        #[test]
        fn test_from_toml_str() {
            let config = HistoryConfig::from_toml_str("max_history = 50").unwrap();
            assert_eq!(config.capacity(), 50);
        }

        #[test]
        fn test_empty_toml_is_default() {
            let config = HistoryConfig::from_toml_str("").unwrap();
            assert_eq!(config, HistoryConfig::default());
        }

        #[test]
        fn test_zero_rejected_at_parse() {
            let err = HistoryConfig::from_toml_str("max_history = 0").unwrap_err();
            assert!(matches!(err, HistoryConfigError::Toml(_)));
        }

        #[test]
        fn test_unknown_field_rejected() {
            assert!(HistoryConfig::from_toml_str("max_depth = 3").is_err());
        }

        #[test]
        fn test_from_json_str() {
            let config = HistoryConfig::from_json_str(r#"{ "max_history": 3 }"#).unwrap();
            assert_eq!(config.capacity(), 3);

            let config = HistoryConfig::from_json_str(r#"{ "max_history": null }"#).unwrap();
            assert!(!config.is_bounded());
        }

        #[test]
        fn test_toml_roundtrip_through_file() {
            let config = HistoryConfig::new().with_max_history(NonZeroUsize::new(12).unwrap());
            let text = config.to_toml_string().unwrap();

            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(text.as_bytes()).unwrap();
            let loaded = HistoryConfig::from_toml_file(file.path()).unwrap();
            assert_eq!(loaded, config);
        }

        #[test]
        fn test_from_json_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            file.write_all(br#"{ "max_history": 4 }"#).unwrap();
            let loaded = HistoryConfig::from_json_file(file.path()).unwrap();
            assert_eq!(loaded.capacity(), 4);
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let err = HistoryConfig::from_toml_file("/nonexistent/rewind.toml").unwrap_err();
            assert!(matches!(err, HistoryConfigError::Io(_)));
            assert!(std::error::Error::source(&err).is_some());
        }
    }
}
