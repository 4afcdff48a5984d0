//! Composition Tests
//!
//! Building configuration A and then B installs the same members as a
//! single configuration declaring A's rules followed by B's.

use dlg_config::{DelegateConfig, DelegateSettings, RedefinePolicy, RuleKind};
use dlg_core::Promise;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const NAMES: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn declare(config: DelegateConfig, kind: usize, name: usize) -> DelegateConfig {
    let name = NAMES[name % NAMES.len()];
    match kind % 5 {
        0 => config.method(name),
        1 => config.chain(name),
        2 => config.getter(name),
        3 => config.setter(name),
        _ => config.access(name),
    }
}

fn build(settings: DelegateSettings, rules: &[(usize, usize)]) -> DelegateConfig {
    rules
        .iter()
        .fold(DelegateConfig::new().with_settings(settings), |config, &(kind, name)| {
            declare(config, kind, name)
        })
}

fn installed(config: &DelegateConfig) -> (bool, Vec<(String, Option<dlg_core::MemberKind>)>) {
    let (promise, _resolver) = Promise::pending();
    let ok = config.apply(&promise).is_ok();
    let members = promise
        .member_names()
        .into_iter()
        .map(|name| {
            let kind = promise.member_kind(&name);
            (name, kind)
        })
        .collect();
    (ok, members)
}

proptest! {
    #[test]
    fn prop_extend_matches_single_configuration(
        rules in proptest::collection::vec((0..5usize, 0..4usize), 0..24),
        split in 0..24usize,
        overwrite in any::<bool>(),
    ) {
        let policy = if overwrite { RedefinePolicy::Overwrite } else { RedefinePolicy::Strict };
        let settings = DelegateSettings::new().with_redefine(policy);
        let split = split.min(rules.len());

        let a = build(settings, &rules[..split]);
        let b = build(settings, &rules[split..]);
        let joined = a.extend(&b);
        let single = build(settings, &rules);

        prop_assert_eq!(joined.summary(), single.summary());
        prop_assert_eq!(installed(&joined), installed(&single));
        prop_assert_eq!(joined.validate().is_ok(), installed(&single).0);
    }
}

#[test]
fn test_extend_preserves_kinds() {
    let a = DelegateConfig::new().method("save").getter("id");
    let b = DelegateConfig::new().chain("touch").access("title");

    assert_eq!(
        a.extend(&b).summary(),
        vec![
            (RuleKind::Method, "save"),
            (RuleKind::Getter, "id"),
            (RuleKind::Chain, "touch"),
            (RuleKind::Access, "title"),
        ]
    );
}

#[test]
fn test_extend_uses_receiver_settings() {
    let strict = DelegateConfig::new().getter("a");
    let overwrite = DelegateConfig::new()
        .with_settings(DelegateSettings::new().with_redefine(RedefinePolicy::Overwrite))
        .getter("a");

    assert!(overwrite.clone().extend(&strict).validate().is_ok());
    assert!(strict.extend(&overwrite).validate().is_err());
}
