//! Delegate configuration: rule registry, applicator and wrapper

use crate::compile;
use crate::rule::{Rule, RuleKind};
use crate::settings::DelegateSettings;
use dlg_core::{ApplyError, Promise};
use std::collections::HashSet;
use std::sync::Arc;

/// Ordered list of delegation rules
///
/// Every builder method consumes the configuration and returns it with one
/// more rule appended, so a finished configuration is never mutated by a
/// later declaration. Clones share compiled rules.
///
/// ```rust,ignore
/// let config = DelegateConfig::new()
///     .method("save")
///     .chain("touch")
///     .getter_with("owner", DelegateConfig::new().getter("name"))
///     .access("title");
///
/// let p = config.apply(&fetch_document())?;
/// let owner_name = p.get("owner")?.get("name")?.await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct DelegateConfig {
    rules: Vec<Rule>,
    settings: DelegateSettings,
}

impl DelegateConfig {
    /// Create empty configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With settings; applies to every rule of this configuration
    #[inline]
    #[must_use]
    pub fn with_settings(mut self, settings: DelegateSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &DelegateSettings {
        &self.settings
    }

    fn push(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Forward method `name`; calling it returns a promise for the call's
    /// result
    #[must_use]
    pub fn method(self, name: impl Into<Arc<str>>) -> Self {
        self.push(compile::method(name.into(), None))
    }

    /// Like [`method`](Self::method), applying `nested` to the returned
    /// promise
    #[must_use]
    pub fn method_with(self, name: impl Into<Arc<str>>, nested: DelegateConfig) -> Self {
        self.push(compile::method(name.into(), Some(Arc::new(nested))))
    }

    /// Forward method `name`; calling it returns the decorated promise itself
    #[must_use]
    pub fn chain(self, name: impl Into<Arc<str>>) -> Self {
        self.push(compile::chain(name.into(), None))
    }

    /// Like [`chain`](Self::chain); `nested` is applied to the discarded
    /// call promise
    #[must_use]
    pub fn chain_with(self, name: impl Into<Arc<str>>, nested: DelegateConfig) -> Self {
        self.push(compile::chain(name.into(), Some(Arc::new(nested))))
    }

    /// Read-only property `name`
    #[must_use]
    pub fn getter(self, name: impl Into<Arc<str>>) -> Self {
        self.push(compile::getter(name.into(), None))
    }

    /// Read-only property `name`, applying `nested` to every read
    #[must_use]
    pub fn getter_with(self, name: impl Into<Arc<str>>, nested: DelegateConfig) -> Self {
        self.push(compile::getter(name.into(), Some(Arc::new(nested))))
    }

    /// Write-only property `name`
    #[must_use]
    pub fn setter(self, name: impl Into<Arc<str>>) -> Self {
        self.push(compile::setter(name.into()))
    }

    /// Read-write property `name`
    #[must_use]
    pub fn access(self, name: impl Into<Arc<str>>) -> Self {
        self.push(compile::access(name.into(), None))
    }

    /// Read-write property `name`, applying `nested` to every read
    #[must_use]
    pub fn access_with(self, name: impl Into<Arc<str>>, nested: DelegateConfig) -> Self {
        self.push(compile::access(name.into(), Some(Arc::new(nested))))
    }

    /// Append the rules of `other` after our own
    ///
    /// Appended rules are installed with this configuration's settings.
    #[must_use]
    pub fn extend(mut self, other: &DelegateConfig) -> Self {
        self.rules.extend(other.rules.iter().cloned());
        self
    }

    /// Rules in installation order
    #[inline]
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rules are declared
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check if any rule targets `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|rule| rule.name() == name)
    }

    /// Detect redefinitions `apply` would reject
    ///
    /// Only sees this configuration and its nested ones; members installed
    /// on a promise by other configurations can still collide.
    ///
    /// # Errors
    /// `ApplyError::Redefinition` for the first name declared again after a
    /// non-configurable accessor
    pub fn validate(&self) -> Result<(), ApplyError> {
        let mut sealed = HashSet::new();
        let configurable = self.settings.redefine.configurable();

        for rule in &self.rules {
            if sealed.contains(rule.name()) {
                return Err(ApplyError::Redefinition {
                    name: rule.name().to_string(),
                });
            }
            if rule.kind().defines_accessor() && !configurable {
                sealed.insert(rule.name());
            }
            if let Some(nested) = rule.nested() {
                nested.validate()?;
            }
        }
        Ok(())
    }

    /// Install every rule on `promise`, in declaration order
    ///
    /// Returns the same promise handle. Stops at the first failing rule;
    /// rules installed before it stay installed.
    ///
    /// # Errors
    /// `ApplyError::Redefinition` when a rule targets a non-configurable
    /// member
    pub fn apply(&self, promise: &Promise) -> Result<Promise, ApplyError> {
        tracing::debug!(promise = %promise.id(), rules = self.rules.len(), "applying delegate configuration");

        for rule in &self.rules {
            rule.install(promise, &self.settings)?;
        }
        Ok(promise.clone())
    }

    /// Wrap a promise producer so every produced promise is decorated
    pub fn wrap<A, F>(&self, producer: F) -> impl Fn(A) -> Result<Promise, ApplyError> + Send + Sync
    where
        F: Fn(A) -> Promise + Send + Sync,
    {
        let config = self.clone();
        move |args| config.apply(&producer(args))
    }

    /// Like [`wrap`](Self::wrap), handing `context` to every producer call
    pub fn wrap_bound<C, A, F>(
        &self,
        context: C,
        producer: F,
    ) -> impl Fn(A) -> Result<Promise, ApplyError> + Send + Sync
    where
        C: Send + Sync,
        F: Fn(&C, A) -> Promise + Send + Sync,
    {
        let config = self.clone();
        move |args| config.apply(&producer(&context, args))
    }

    /// Rule kinds and names, for diagnostics
    #[must_use]
    pub fn summary(&self) -> Vec<(RuleKind, &str)> {
        self.rules.iter().map(|rule| (rule.kind(), rule.name())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RedefinePolicy;
    use dlg_core::MemberKind;
    use pretty_assertions::assert_eq;

    fn pending() -> Promise {
        Promise::pending().0
    }

    #[test]
    fn config_new_empty() {
        let config = DelegateConfig::new();
        assert!(config.is_empty());
        assert_eq!(config.len(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_keeps_declaration_order() {
        let config = DelegateConfig::new()
            .method("a")
            .chain("b")
            .getter("c")
            .setter("d")
            .access("e");

        assert_eq!(
            config.summary(),
            vec![
                (RuleKind::Method, "a"),
                (RuleKind::Chain, "b"),
                (RuleKind::Getter, "c"),
                (RuleKind::Setter, "d"),
                (RuleKind::Access, "e"),
            ]
        );
        assert!(config.contains("d"));
        assert!(!config.contains("z"));
    }

    #[test]
    fn config_extend_appends() {
        let a = DelegateConfig::new().method("a");
        let b = DelegateConfig::new().getter("b").setter("c");
        let joined = a.extend(&b);

        assert_eq!(joined.len(), 3);
        assert_eq!(b.len(), 2);
        assert_eq!(joined.summary()[1], (RuleKind::Getter, "b"));
    }

    #[test]
    fn apply_returns_same_promise() {
        let p = pending();
        let config = DelegateConfig::new().method("a").access("b");
        let applied = config.apply(&p).unwrap();

        assert!(Promise::ptr_eq(&p, &applied));
        assert_eq!(p.member_names(), vec!["a", "b"]);
        assert_eq!(p.member_kind("b"), Some(MemberKind::ReadWrite));
    }

    #[test]
    fn apply_reuses_config_across_promises() {
        let config = DelegateConfig::new().getter("a");
        let first = pending();
        let second = pending();

        config.apply(&first).unwrap();
        config.apply(&second).unwrap();
        assert!(first.has_member("a"));
        assert!(second.has_member("a"));
    }

    #[test]
    fn apply_strict_rejects_accessor_redefinition() {
        let config = DelegateConfig::new().getter("a").setter("a");
        let err = config.apply(&pending()).unwrap_err();

        assert_eq!(err, ApplyError::Redefinition { name: "a".into() });
        assert_eq!(config.validate().unwrap_err(), err);
    }

    #[test]
    fn apply_overwrite_last_write_wins() {
        let config = DelegateConfig::new()
            .with_settings(DelegateSettings::new().with_redefine(RedefinePolicy::Overwrite))
            .getter("a")
            .setter("a");
        let p = pending();

        assert!(config.validate().is_ok());
        config.apply(&p).unwrap();
        assert_eq!(p.member_kind("a"), Some(MemberKind::WriteOnly));
    }

    #[test]
    fn methods_are_always_overwritable() {
        let config = DelegateConfig::new().method("a").chain("a").getter("a");
        let p = pending();

        assert!(config.validate().is_ok());
        config.apply(&p).unwrap();
        assert_eq!(p.member_kind("a"), Some(MemberKind::ReadOnly));
    }

    #[test]
    fn validate_checks_nested_configurations() {
        let inner = DelegateConfig::new().access("x").getter("x");
        let config = DelegateConfig::new().getter_with("outer", inner);

        assert_eq!(
            config.validate().unwrap_err(),
            ApplyError::Redefinition { name: "x".into() }
        );
        // Nested rules are only installed on promises produced later
        assert!(config.apply(&pending()).is_ok());
    }

    #[test]
    fn apply_stops_at_first_failure() {
        let p = pending();
        DelegateConfig::new().getter("a").apply(&p).unwrap();

        let err = DelegateConfig::new()
            .method("before")
            .access("a")
            .method("after")
            .apply(&p)
            .unwrap_err();

        assert!(matches!(err, ApplyError::Redefinition { .. }));
        assert!(p.has_member("before"));
        assert!(!p.has_member("after"));
    }
}
