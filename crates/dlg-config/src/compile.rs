//! Rule compiler
//!
//! Turns a rule declaration into an installer. Installers only define
//! members; every synthetic member, when used, schedules a fresh
//! continuation on the promise it is called on and reaches into the settled
//! result by name.

use crate::config::DelegateConfig;
use crate::rule::{Installer, Rule, RuleKind};
use crate::settings::DelegateSettings;
use dlg_core::{Accessor, DelegateError, Member, Promise, Target, Value};
use std::sync::Arc;

pub(crate) fn method(name: Arc<str>, nested: Option<Arc<DelegateConfig>>) -> Rule {
    let member = Arc::clone(&name);
    let config = nested.clone();
    let install: Installer = Arc::new(move |promise: &Promise, settings: &DelegateSettings| {
        let name = Arc::clone(&member);
        let config = config.clone();
        let trace = settings.trace_continuations;
        promise.define(
            member.to_string(),
            Member::method(move |this, args| {
                let next = invoke(this, Arc::clone(&name), args, trace);
                apply_nested(config.as_deref(), next)
            }),
        )
    });
    Rule::new(RuleKind::Method, name, nested, install)
}

pub(crate) fn chain(name: Arc<str>, nested: Option<Arc<DelegateConfig>>) -> Rule {
    let member = Arc::clone(&name);
    let config = nested.clone();
    let install: Installer = Arc::new(move |promise: &Promise, settings: &DelegateSettings| {
        let name = Arc::clone(&member);
        let config = config.clone();
        let trace = settings.trace_continuations;
        promise.define(
            member.to_string(),
            Member::method(move |this, args| {
                let _ = apply_nested(config.as_deref(), invoke(this, Arc::clone(&name), args, trace));
                this.clone()
            }),
        )
    });
    Rule::new(RuleKind::Chain, name, nested, install)
}

pub(crate) fn getter(name: Arc<str>, nested: Option<Arc<DelegateConfig>>) -> Rule {
    accessor(RuleKind::Getter, name, nested)
}

pub(crate) fn setter(name: Arc<str>) -> Rule {
    accessor(RuleKind::Setter, name, None)
}

pub(crate) fn access(name: Arc<str>, nested: Option<Arc<DelegateConfig>>) -> Rule {
    accessor(RuleKind::Access, name, nested)
}

fn accessor(kind: RuleKind, name: Arc<str>, nested: Option<Arc<DelegateConfig>>) -> Rule {
    let member = Arc::clone(&name);
    let config = nested.clone();
    let install: Installer = Arc::new(move |promise: &Promise, settings: &DelegateSettings| {
        let trace = settings.trace_continuations;
        let mut descriptor = Accessor::new().configurable(settings.redefine.configurable());

        if matches!(kind, RuleKind::Getter | RuleKind::Access) {
            let name = Arc::clone(&member);
            let config = config.clone();
            descriptor = descriptor.with_get(move |this| {
                apply_nested(config.as_deref(), read(this, Arc::clone(&name), trace))
            });
        }
        if matches!(kind, RuleKind::Setter | RuleKind::Access) {
            let name = Arc::clone(&member);
            descriptor = descriptor
                .with_set(move |this, value| write(this, Arc::clone(&name), value, trace));
        }

        promise.define(member.to_string(), descriptor)
    });
    Rule::new(kind, name, nested, install)
}

/// Apply `nested` to a promise produced by a rule
///
/// Runs inside a synthetic member, where nothing can be raised to the
/// caller; a failed installation leaves the promise partially decorated.
pub(crate) fn apply_nested(nested: Option<&DelegateConfig>, promise: Promise) -> Promise {
    if let Some(config) = nested {
        if let Err(error) = config.apply(&promise) {
            tracing::warn!(promise = %promise.id(), %error, "nested configuration only partially applied");
        }
    }
    promise
}

fn invoke(this: &Promise, name: Arc<str>, args: Vec<Value>, trace: bool) -> Promise {
    let source = this.id();
    this.then(move |result| {
        if trace {
            tracing::trace!(promise = %source, member = %name, args = args.len(), "delegated call");
        }
        target_of(&result, &name)?.call(&name, args)
    })
}

fn read(this: &Promise, name: Arc<str>, trace: bool) -> Promise {
    let source = this.id();
    this.then(move |result| {
        if trace {
            tracing::trace!(promise = %source, member = %name, "delegated read");
        }
        target_of(&result, &name)?.get(&name)
    })
}

fn write(this: &Promise, name: Arc<str>, value: Value, trace: bool) -> Promise {
    let source = this.id();
    this.then(move |result| {
        if trace {
            tracing::trace!(promise = %source, member = %name, "delegated write");
        }
        target_of(&result, &name)?.set(&name, value)?;
        Ok(Value::null())
    })
}

fn target_of<'a>(result: &'a Value, name: &str) -> Result<&'a Arc<dyn Target>, DelegateError> {
    result.as_object().ok_or_else(|| DelegateError::NotAnObject {
        name: name.to_string(),
        found: result.type_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlg_core::MemberKind;

    fn installed(rule: &Rule, settings: DelegateSettings) -> Promise {
        let (promise, _resolver) = Promise::pending();
        rule.install(&promise, &settings).unwrap();
        promise
    }

    #[test]
    fn compiled_member_kinds() {
        let settings = DelegateSettings::default();
        let cases = [
            (method("a".into(), None), MemberKind::Method),
            (chain("a".into(), None), MemberKind::Method),
            (getter("a".into(), None), MemberKind::ReadOnly),
            (setter("a".into()), MemberKind::WriteOnly),
            (access("a".into(), None), MemberKind::ReadWrite),
        ];

        for (rule, expected) in cases {
            let promise = installed(&rule, settings);
            assert_eq!(promise.member_kind("a"), Some(expected), "{}", rule.kind());
        }
    }

    #[test]
    fn rule_keeps_nested_configuration() {
        let inner = Arc::new(DelegateConfig::new().getter("baz"));
        let rule = getter("bar".into(), Some(inner));
        assert_eq!(rule.nested().map(DelegateConfig::len), Some(1));
        assert!(setter("bar".into()).nested().is_none());
    }

    #[test]
    fn target_of_rejects_data() {
        let err = target_of(&Value::from("text"), "len").unwrap_err();
        assert_eq!(
            err,
            DelegateError::NotAnObject {
                name: "len".into(),
                found: "string",
            }
        );
    }
}
