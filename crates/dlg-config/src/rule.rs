//! Compiled delegation rules

use crate::config::DelegateConfig;
use crate::settings::DelegateSettings;
use dlg_core::{ApplyError, Promise};
use std::fmt;
use std::sync::Arc;

/// Installs one rule's synthetic member onto a promise
pub(crate) type Installer =
    Arc<dyn Fn(&Promise, &DelegateSettings) -> Result<(), ApplyError> + Send + Sync>;

/// What a rule installs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    /// Method returning a promise for the delegated call's result
    Method,
    /// Method returning the decorated promise itself
    Chain,
    /// Read-only property
    Getter,
    /// Write-only property
    Setter,
    /// Read-write property
    Access,
}

impl RuleKind {
    /// Whether the rule installs an accessor rather than a method
    #[inline]
    #[must_use]
    pub fn defines_accessor(self) -> bool {
        matches!(self, Self::Getter | Self::Setter | Self::Access)
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Chain => "chain",
            Self::Getter => "getter",
            Self::Setter => "setter",
            Self::Access => "access",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single compiled rule
///
/// Immutable once built; holds no per-promise state, so one rule can be
/// installed on any number of promises.
#[derive(Clone)]
pub struct Rule {
    kind: RuleKind,
    name: Arc<str>,
    nested: Option<Arc<DelegateConfig>>,
    install: Installer,
}

impl Rule {
    pub(crate) fn new(
        kind: RuleKind,
        name: Arc<str>,
        nested: Option<Arc<DelegateConfig>>,
        install: Installer,
    ) -> Self {
        Self {
            kind,
            name,
            nested,
            install,
        }
    }

    /// Rule kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    /// Member name on the promise and on the eventual result
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration applied to the promises this rule produces
    #[inline]
    #[must_use]
    pub fn nested(&self) -> Option<&DelegateConfig> {
        self.nested.as_deref()
    }

    pub(crate) fn install(
        &self,
        promise: &Promise,
        settings: &DelegateSettings,
    ) -> Result<(), ApplyError> {
        (self.install)(promise, settings)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("nested", &self.nested)
            .finish()
    }
}
