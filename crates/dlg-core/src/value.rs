//! Dynamic values flowing through delegated members
//!
//! Results are structurally untyped until they settle, so every argument,
//! return value and property passes through [`Value`].

use crate::promise::Promise;
use crate::target::Target;
use std::sync::Arc;

/// A settled or deferred dynamic value
///
/// Cheap to clone: data is copied, objects and promises are shared handles.
#[derive(Debug, Clone)]
pub enum Value {
    /// Plain data (strings, numbers, arrays, null, ...)
    Data(serde_json::Value),

    /// Object exposing named members
    Object(Arc<dyn Target>),

    /// Value that has not settled yet
    Deferred(Promise),
}

impl Value {
    /// Create null value
    #[inline]
    #[must_use]
    pub fn null() -> Self {
        Self::Data(serde_json::Value::Null)
    }

    /// Wrap a target as an object value
    #[inline]
    #[must_use]
    pub fn object(target: impl Target) -> Self {
        Self::Object(Arc::new(target))
    }

    /// Check for null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Data(serde_json::Value::Null))
    }

    /// Borrow plain data
    #[inline]
    #[must_use]
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    /// Borrow string data
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(serde_json::Value::as_str)
    }

    /// Integer data
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(serde_json::Value::as_i64)
    }

    /// Boolean data
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(serde_json::Value::as_bool)
    }

    /// Borrow object target
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Arc<dyn Target>> {
        match self {
            Self::Object(target) => Some(target),
            _ => None,
        }
    }

    /// Borrow deferred value
    #[inline]
    #[must_use]
    pub fn as_promise(&self) -> Option<&Promise> {
        match self {
            Self::Deferred(promise) => Some(promise),
            _ => None,
        }
    }

    /// Short type name for diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Data(serde_json::Value::Null) => "null",
            Self::Data(serde_json::Value::Bool(_)) => "boolean",
            Self::Data(serde_json::Value::Number(_)) => "number",
            Self::Data(serde_json::Value::String(_)) => "string",
            Self::Data(serde_json::Value::Array(_)) => "array",
            Self::Data(serde_json::Value::Object(_)) => "map",
            Self::Object(_) => "object",
            Self::Deferred(_) => "promise",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::null()
    }
}

/// Data compares structurally; objects and promises by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Deferred(a), Self::Deferred(b)) => Promise::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Self::Data(data)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Data(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Data(s.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Data(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Data(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Data(b.into())
    }
}

impl From<Promise> for Value {
    fn from(promise: Promise) -> Self {
        Self::Deferred(promise)
    }
}

impl<T: Target> From<Arc<T>> for Value {
    fn from(target: Arc<T>) -> Self {
        Self::Object(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from("bar").as_str(), Some("bar"));
        assert_eq!(Value::from(42_i64).as_i64(), Some(42));
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert!(Value::default().is_null());
    }

    #[test]
    fn value_type_names() {
        assert_eq!(Value::from("x").type_name(), "string");
        assert_eq!(Value::from(1.5).type_name(), "number");
        assert_eq!(Value::from(Record::builder().build()).type_name(), "object");
        assert_eq!(Value::from(Promise::resolved(Value::null())).type_name(), "promise");
    }

    #[test]
    fn value_equality_by_identity_for_objects() {
        let record = Record::builder().field("a", 1_i64).build();
        let a = Value::from(Arc::clone(&record));
        let b = Value::from(record);
        let other = Value::from(Record::builder().field("a", 1_i64).build());

        assert_eq!(a, b);
        assert_ne!(a, other);
        assert_ne!(a, Value::from("a"));
    }
}
