//! Testing utilities for DLG workspace
//!
//! Shared result fixtures, a call log and tracing setup.

#![allow(missing_docs)]

use dlg_core::{Promise, Record, Value};
use parking_lot::Mutex;
use std::sync::Arc;

/// Install a test-friendly tracing subscriber; `RUST_LOG` controls output
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared log of method invocations
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(String, Vec<Value>)>>>,
}

impl CallLog {
    pub fn record(&self, name: &str, args: Vec<Value>) {
        self.calls.lock().push((name.to_string(), args));
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

/// Record whose `method` logs its arguments and returns `returns`
pub fn recording_record(log: &CallLog, method: &str, returns: Value) -> Arc<Record> {
    let log = log.clone();
    let name = method.to_string();
    Record::builder()
        .method(method, move |_, args| {
            log.record(&name, args);
            Ok(returns.clone())
        })
        .build()
}

/// Record whose `method` increments its `callCount` field
pub fn counting_record(method: &str) -> Arc<Record> {
    Record::builder()
        .field("callCount", 0_i64)
        .method(method, |this, _| {
            let count = this.field("callCount").as_i64().unwrap_or(0) + 1;
            this.set_field("callCount", count);
            Ok(Value::null())
        })
        .build()
}

/// Record with a single field
pub fn field_record(name: &str, value: impl Into<Value>) -> Arc<Record> {
    Record::builder().field(name, value).build()
}

/// Promise settled with a single-field record
pub fn resolved_field(name: &str, value: impl Into<Value>) -> Promise {
    Promise::resolved(field_record(name, value))
}

/// Data value from JSON
pub fn json(data: serde_json::Value) -> Value {
    Value::Data(data)
}
