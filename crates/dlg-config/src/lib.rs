//! DLG Config
//!
//! Declares, ahead of time, which methods and properties of a promise's
//! eventual result should be reachable on the promise itself.
//!
//! # Core Concepts
//!
//! - [`DelegateConfig`]: ordered rule registry with a consuming builder API
//! - [`Rule`]: one compiled rule (method, chain, getter, setter or access)
//! - [`DelegateConfig::apply`]: installs every rule on a promise, in place
//! - [`DelegateConfig::wrap`]: decorates every promise a producer returns
//! - [`DelegateSettings`]: redefinition policy and continuation tracing
//!
//! # Example
//!
//! ```rust,ignore
//! use dlg_config::DelegateConfig;
//! use dlg_core::{Promise, Record};
//!
//! let p = Promise::resolved(Record::builder().field("foo", "bar").build());
//! DelegateConfig::new().access("foo").apply(&p)?;
//!
//! p.set("foo", "baz")?;
//! assert_eq!(p.get("foo")?.await?.as_str(), Some("baz"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod compile;
mod config;
mod rule;
mod settings;

pub use config::DelegateConfig;
pub use rule::{Rule, RuleKind};
pub use settings::{DelegateSettings, RedefinePolicy, SettingsError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for declaring and using delegations
    pub use crate::{DelegateConfig, DelegateSettings, RedefinePolicy};
    pub use dlg_core::{run_microtasks, DelegateError, Promise, Record, Resolver, Target, Value};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
