//! General-purpose result object
//!
//! [`Record`] is a field map plus named methods, built once with
//! [`RecordBuilder`]. Fields stay writable afterwards; the method table is
//! fixed.

use crate::error::DelegateError;
use crate::target::Target;
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Method body; receives the record it is called on
pub type RecordMethod =
    Arc<dyn Fn(&Record, Vec<Value>) -> Result<Value, DelegateError> + Send + Sync>;

/// Object with writable fields and a fixed method table
pub struct Record {
    fields: RwLock<HashMap<String, Value>>,
    methods: HashMap<String, RecordMethod>,
}

impl Record {
    /// Start building a record
    #[inline]
    #[must_use]
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }

    /// Read field, `null` when absent
    #[must_use]
    pub fn field(&self, name: &str) -> Value {
        self.fields.read().get(name).cloned().unwrap_or_default()
    }

    /// Write field
    pub fn set_field(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.write().insert(name.into(), value.into());
    }

    /// Check if field is present
    #[inline]
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.read().contains_key(name)
    }

    /// Check if method is present
    #[inline]
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        methods.sort_unstable();
        f.debug_struct("Record")
            .field("fields", &*self.fields.read())
            .field("methods", &methods)
            .finish()
    }
}

impl Target for Record {
    fn get(&self, name: &str) -> Result<Value, DelegateError> {
        Ok(self.field(name))
    }

    fn set(&self, name: &str, value: Value) -> Result<(), DelegateError> {
        self.set_field(name, value);
        Ok(())
    }

    fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, DelegateError> {
        // Clone out so the body may touch our fields without lock juggling
        let method = self
            .methods
            .get(name)
            .cloned()
            .ok_or_else(|| DelegateError::NotCallable {
                name: name.to_string(),
            })?;
        method(self, args)
    }
}

/// Builder for [`Record`]
#[derive(Default)]
pub struct RecordBuilder {
    fields: HashMap<String, Value>,
    methods: HashMap<String, RecordMethod>,
}

impl RecordBuilder {
    /// Add field
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add method
    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Record, Vec<Value>) -> Result<Value, DelegateError> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(body));
        self
    }

    /// Finish into a shared record
    #[must_use]
    pub fn build(self) -> Arc<Record> {
        Arc::new(Record {
            fields: RwLock::new(self.fields),
            methods: self.methods,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fields_read_and_write() {
        let record = Record::builder().field("foo", "bar").build();
        assert_eq!(record.get("foo").unwrap().as_str(), Some("bar"));

        record.set("foo", "baz".into()).unwrap();
        assert_eq!(record.field("foo").as_str(), Some("baz"));
    }

    #[test]
    fn record_missing_field_is_null() {
        let record = Record::builder().build();
        assert!(record.get("nope").unwrap().is_null());
        assert!(!record.has_field("nope"));
    }

    #[test]
    fn record_method_sees_self() {
        let record = Record::builder()
            .field("count", 0_i64)
            .method("bump", |this, args| {
                let by = args.first().and_then(Value::as_i64).unwrap_or(1);
                let next = this.field("count").as_i64().unwrap_or(0) + by;
                this.set_field("count", next);
                Ok(next.into())
            })
            .build();

        assert_eq!(record.call("bump", vec![5_i64.into()]).unwrap().as_i64(), Some(5));
        assert_eq!(record.field("count").as_i64(), Some(5));
    }

    #[test]
    fn record_missing_method_not_callable() {
        let record = Record::builder().field("foo", "bar").build();
        let err = record.call("foo", vec![]).unwrap_err();
        assert_eq!(err, DelegateError::NotCallable { name: "foo".into() });
    }
}
