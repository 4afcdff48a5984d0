//! Eventual result objects
//!
//! A [`Target`] is whatever a promise settles to when delegated members are
//! meant to reach into it. Members are looked up by name at the moment the
//! continuation runs, never ahead of time.

use crate::error::DelegateError;
use crate::value::Value;

/// Object with late-bound named members
///
/// Implementations use interior mutability: writes arrive through `&self`
/// from continuations that only hold a shared handle.
pub trait Target: Send + Sync + std::fmt::Debug + 'static {
    /// Read property `name`
    ///
    /// # Errors
    /// `DelegateError::NotReadable` unless overridden
    fn get(&self, name: &str) -> Result<Value, DelegateError> {
        Err(DelegateError::NotReadable {
            name: name.to_string(),
        })
    }

    /// Write property `name`
    ///
    /// # Errors
    /// `DelegateError::NotWritable` unless overridden
    fn set(&self, name: &str, value: Value) -> Result<(), DelegateError> {
        let _ = value;
        Err(DelegateError::NotWritable {
            name: name.to_string(),
        })
    }

    /// Invoke method `name` with `args`
    ///
    /// # Errors
    /// `DelegateError::NotCallable` unless overridden
    fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, DelegateError> {
        let _ = args;
        Err(DelegateError::NotCallable {
            name: name.to_string(),
        })
    }
}
