//! Settings shared by every rule of a configuration

use serde::{Deserialize, Serialize};

/// How accessor rules treat an existing member of the same name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedefinePolicy {
    /// Accessors are non-configurable; defining one twice fails `apply`
    #[default]
    Strict,

    /// Accessors are configurable; last definition wins
    Overwrite,
}

impl RedefinePolicy {
    /// Whether installed accessors may be replaced later
    #[inline]
    #[must_use]
    pub fn configurable(self) -> bool {
        matches!(self, Self::Overwrite)
    }
}

/// Configuration-wide settings
///
/// ```toml
/// redefine = "overwrite"
/// trace_continuations = true
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelegateSettings {
    /// Accessor redefinition policy
    pub redefine: RedefinePolicy,

    /// Emit a `trace` event every time a delegated continuation fires
    pub trace_continuations: bool,
}

impl DelegateSettings {
    /// Create default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With redefinition policy
    #[inline]
    #[must_use]
    pub fn with_redefine(mut self, redefine: RedefinePolicy) -> Self {
        self.redefine = redefine;
        self
    }

    /// With continuation tracing
    #[inline]
    #[must_use]
    pub fn with_trace_continuations(mut self, enabled: bool) -> Self {
        self.trace_continuations = enabled;
        self
    }

    /// Parse settings from a TOML document; missing keys keep defaults
    ///
    /// # Errors
    /// `SettingsError::Parse` on malformed TOML or unknown values
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(source)?)
    }
}

/// Errors loading [`DelegateSettings`]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// TOML could not be parsed into settings
    #[error("invalid delegate settings: {0}")]
    Parse(#[from] toml::de::Error),
}
