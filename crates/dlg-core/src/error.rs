//! Error types for DLG Core
//!
//! Two families:
//! - [`DelegateError`]: failures of delegated work. Carried by the rejection
//!   channel of a [`Promise`](crate::Promise), or returned synchronously when
//!   a caller misuses a promise's member table.
//! - [`ApplyError`]: configuration errors raised while installing members.

/// Failure of a delegated call, read or write
///
/// Cloned into every reaction registered on a rejected promise, so all
/// payloads are owned strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DelegateError {
    /// The promise carries no delegated member with this name
    #[error("no delegated member named `{name}`")]
    UnknownMember {
        /// Member name
        name: String,
    },

    /// Member (or result method) exists but cannot be called
    #[error("`{name}` is not callable")]
    NotCallable {
        /// Member name
        name: String,
    },

    /// Member is write-only
    #[error("`{name}` cannot be read")]
    NotReadable {
        /// Member name
        name: String,
    },

    /// Member is read-only
    #[error("`{name}` cannot be written")]
    NotWritable {
        /// Member name
        name: String,
    },

    /// Settled result has no named members
    #[error("cannot access `{name}` on a {found} value")]
    NotAnObject {
        /// Member name
        name: String,
        /// Type name of the settled value
        found: &'static str,
    },

    /// Error raised by the eventual result itself
    #[error("target error: {0}")]
    Target(String),

    /// Promise was resolved with itself
    #[error("promise resolved with itself")]
    Cycle,

    /// Resolver dropped before settling
    #[error("promise abandoned before settlement")]
    Abandoned,
}

impl DelegateError {
    /// Create target error
    #[inline]
    #[must_use]
    pub fn target(message: impl Into<String>) -> Self {
        Self::Target(message.into())
    }

    /// Check if error comes from misuse of a promise's member table
    ///
    /// Access errors are returned synchronously; every other variant only
    /// ever travels through a rejection.
    #[inline]
    #[must_use]
    pub fn is_access_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMember { .. }
                | Self::NotCallable { .. }
                | Self::NotReadable { .. }
                | Self::NotWritable { .. }
        )
    }
}

/// Errors raised while installing delegated members
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// Existing member is not configurable
    #[error("cannot redefine non-configurable member `{name}`")]
    Redefinition {
        /// Member name
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delegate_error_display() {
        let err = DelegateError::NotAnObject {
            name: "foo".to_string(),
            found: "string",
        };
        assert_eq!(err.to_string(), "cannot access `foo` on a string value");
    }

    #[test]
    fn delegate_error_is_access_error() {
        assert!(DelegateError::UnknownMember { name: "a".into() }.is_access_error());
        assert!(DelegateError::NotWritable { name: "a".into() }.is_access_error());
        assert!(!DelegateError::target("boom").is_access_error());
        assert!(!DelegateError::Abandoned.is_access_error());
    }

    #[test]
    fn apply_error_display() {
        let err = ApplyError::Redefinition { name: "bar".into() };
        assert!(err.to_string().contains("`bar`"));
    }
}
