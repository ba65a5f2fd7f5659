#![forbid(unsafe_code)]

//! History configuration.
//!
//! [`HistoryConfig`] collects the tunables of a [`HistoryManager`]: the
//! per-stack depth limit and the shape of the root group. With the
//! `config` feature it loads from TOML at startup.
//!
//! # Loading
//!
//! ```toml
//! # tessera-history.toml
//! max_depth = 500
//! root_policy = "focused_first"
//! root_id = "Main"
//! root_name = "Main Window"
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::from_toml_file("tessera-history.toml")?;
//! let manager = HistoryManager::init(config)?;
//! ```
//!
//! # Defaults
//!
//! `HistoryConfig::default()` keeps every stack unbounded and gives the
//! root the [`PolicyKind::TimestampOnly`] policy.
//!
//! [`HistoryManager`]: crate::HistoryManager

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::policy::PolicyKind;

/// Configuration for a [`HistoryManager`](crate::HistoryManager).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct HistoryConfig {
    /// Maximum entries per stack created by the manager (0 = unlimited).
    pub max_depth: usize,
    /// Resolution policy of the root group.
    pub root_policy: PolicyKind,
    /// Id of the root group.
    pub root_id: String,
    /// Display name of the root group.
    pub root_name: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            root_policy: PolicyKind::TimestampOnly,
            root_id: "Root".into(),
            root_name: "History".into(),
        }
    }
}

impl HistoryConfig {
    /// Unbounded stacks with the default root.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Set the per-stack depth limit (0 = unlimited).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the root policy.
    #[must_use]
    pub fn with_root_policy(mut self, policy: PolicyKind) -> Self {
        self.root_policy = policy;
        self
    }

    /// Set the root id and display name.
    #[must_use]
    pub fn with_root(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.root_id = id.into();
        self.root_name = name.into();
        self
    }

    /// Whether stacks grow without limit.
    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.max_depth == 0
    }

    /// Check the configuration.
    ///
    /// Returns a list of problems. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.root_id.trim().is_empty() {
            errors.push("root_id must not be empty".into());
        }
        if self.root_name.trim().is_empty() {
            errors.push("root_name must not be empty".into());
        }
        errors
    }

    /// Parse and validate a TOML string.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Toml`] on malformed input, [`ConfigError::Validation`]
    /// if [`validate`](Self::validate) reports problems.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Serialize to a TOML string.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Serialize`] if encoding fails.
    #[cfg(feature = "config")]
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Failure to load a [`HistoryConfig`].
#[cfg(feature = "config")]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// TOML encode error.
    #[error("TOML encode error: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Validation errors.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
