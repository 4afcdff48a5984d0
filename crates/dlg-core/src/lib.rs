//! DLG Core
//!
//! Building blocks shared by delegation configurations:
//! - [`Value`]: dynamic values passed to and returned from delegated members
//! - [`Target`]: eventual result objects with late-bound named members
//! - [`Record`]: ready-made target with fields and methods
//! - [`Promise`]: deferred value with `then` scheduling and a member table
//! - [`run_microtasks`]: drive queued continuations without an executor
//!
//! # Example
//!
//! ```rust,ignore
//! use dlg_core::{Promise, Record, Value};
//!
//! let record = Record::builder().field("foo", "bar").build();
//! let p = Promise::resolved(record);
//!
//! let foo = p.then(|result| match result {
//!     Value::Object(target) => target.get("foo"),
//!     other => Ok(other),
//! });
//! assert_eq!(foo.await?.as_str(), Some("bar"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod member;
mod microtask;
mod promise;
mod record;
mod target;
mod value;

pub use error::{ApplyError, DelegateError};
pub use member::{Accessor, GetFn, Member, MemberKind, MethodFn, SetFn};
pub use microtask::run_microtasks;
pub use promise::{Outcome, Promise, PromiseId, Resolver};
pub use record::{Record, RecordBuilder, RecordMethod};
pub use target::Target;
pub use value::Value;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
