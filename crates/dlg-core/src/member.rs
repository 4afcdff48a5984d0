//! Synthetic members installed on a promise
//!
//! The member table is the promise's own-property table: installing a member
//! never replaces or wraps the promise, it only adds or overwrites an entry.

use crate::promise::Promise;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Synthetic method; returns the promise handed back to the caller
pub type MethodFn = Arc<dyn Fn(&Promise, Vec<Value>) -> Promise + Send + Sync>;

/// Synthetic property read; returns a promise for the property value
pub type GetFn = Arc<dyn Fn(&Promise) -> Promise + Send + Sync>;

/// Synthetic property write; returns a promise for the write's completion
pub type SetFn = Arc<dyn Fn(&Promise, Value) -> Promise + Send + Sync>;

/// Entry in a promise's member table
#[derive(Clone)]
pub enum Member {
    /// Callable member; always configurable
    Method(MethodFn),

    /// Getter and/or setter pair
    Accessor(Accessor),
}

impl Member {
    /// Wrap a method body
    #[inline]
    #[must_use]
    pub fn method<F>(body: F) -> Self
    where
        F: Fn(&Promise, Vec<Value>) -> Promise + Send + Sync + 'static,
    {
        Self::Method(Arc::new(body))
    }

    /// Whether a later definition may replace this member
    #[inline]
    #[must_use]
    pub fn is_configurable(&self) -> bool {
        match self {
            Self::Method(_) => true,
            Self::Accessor(accessor) => accessor.configurable,
        }
    }

    /// Member kind
    #[must_use]
    pub fn kind(&self) -> MemberKind {
        match self {
            Self::Method(_) => MemberKind::Method,
            Self::Accessor(Accessor {
                get: Some(_),
                set: Some(_),
                ..
            }) => MemberKind::ReadWrite,
            Self::Accessor(Accessor { get: Some(_), .. }) => MemberKind::ReadOnly,
            Self::Accessor(Accessor { set: Some(_), .. }) => MemberKind::WriteOnly,
            Self::Accessor(_) => MemberKind::Inert,
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(_) => f.write_str("Method"),
            Self::Accessor(accessor) => accessor.fmt(f),
        }
    }
}

/// Property descriptor with optional read and write halves
#[derive(Clone, Default)]
pub struct Accessor {
    /// Read half
    pub get: Option<GetFn>,
    /// Write half
    pub set: Option<SetFn>,
    /// Whether a later definition may replace this accessor
    pub configurable: bool,
}

impl Accessor {
    /// Create empty, non-configurable accessor
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With read half
    #[must_use]
    pub fn with_get<F>(mut self, get: F) -> Self
    where
        F: Fn(&Promise) -> Promise + Send + Sync + 'static,
    {
        self.get = Some(Arc::new(get));
        self
    }

    /// With write half
    #[must_use]
    pub fn with_set<F>(mut self, set: F) -> Self
    where
        F: Fn(&Promise, Value) -> Promise + Send + Sync + 'static,
    {
        self.set = Some(Arc::new(set));
        self
    }

    /// Set configurability
    #[inline]
    #[must_use]
    pub fn configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("configurable", &self.configurable)
            .finish()
    }
}

impl From<Accessor> for Member {
    fn from(accessor: Accessor) -> Self {
        Self::Accessor(accessor)
    }
}

/// Shape of an installed member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Callable
    Method,
    /// Getter only
    ReadOnly,
    /// Setter only
    WriteOnly,
    /// Getter and setter
    ReadWrite,
    /// Accessor with neither half
    Inert,
}
