//! Enforcement scenarios over the classic model families.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use warden_core::{Enforcer, RuleKind};

mod scenario_loader;
use scenario_loader::Scenario;

#[tokio::test]
async fn enforcement_vectors() {
    let files = [
        "rbac_basic.json",
        "rbac_domains.json",
        "abac_attributes.json",
        "allow_and_deny.json",
        "deny_override.json",
        "priority.json",
        "key_match.json",
        "path_templates.json",
        "ip_match.json",
        "eval_error.json",
    ];

    for f in files {
        let s = Scenario::load(f);
        let e = Enforcer::with_policy(&s.model, &s.policy_lines())
            .await
            .unwrap_or_else(|err| panic!("vector={} model: {err}", s.description));

        for case in &s.requests {
            let res = e.enforce(case.params.as_slice());

            if let Some(want) = &case.expect_error {
                let err = res.expect_err("expected error");
                assert_eq!(
                    err.client_code().as_str(),
                    want.code,
                    "vector={} params={:?}",
                    s.description,
                    case.params
                );
                continue;
            }

            let got = res.unwrap_or_else(|err| {
                panic!("vector={} params={:?}: {err}", s.description, case.params)
            });
            assert_eq!(
                Some(got),
                case.allow,
                "vector={} params={:?}",
                s.description,
                case.params
            );
        }
    }
}

#[tokio::test]
async fn management_scenario_from_empty_enforcer() {
    let s = Scenario::load("rbac_basic.json");
    let mut e = Enforcer::new(&s.model).await.unwrap();

    let edge = vec!["alice".into(), "admin".into()];
    let grant = vec!["admin".into(), "data1".into(), "write".into()];
    assert!(e.add_rule(RuleKind::Grouping, "g", edge).await.unwrap());
    assert!(e.add_rule(RuleKind::Policy, "p", grant).await.unwrap());
    assert!(e.enforce(&["alice", "data1", "write"]).unwrap());
    assert!(!e.enforce(&["alice", "data1", "read"]).unwrap());
}

#[tokio::test]
async fn concurrent_readers_share_one_enforcer() {
    let s = Scenario::load("abac_attributes.json");
    let e = Enforcer::with_policy(&s.model, &s.policy_lines())
        .await
        .unwrap();
    let before = e.policy_snapshot();
    let e = Arc::new(e);

    std::thread::scope(|scope| {
        for i in 0..8 {
            let e = Arc::clone(&e);
            scope.spawn(move || {
                let (age, want) = if i % 2 == 0 { (30, true) } else { (12, false) };
                for _ in 0..100 {
                    let sub = format!(r#"{{"Age": {age}}}"#);
                    assert_eq!(e.enforce(&[sub.as_str(), "data1", "read"]).unwrap(), want);
                }
            });
        }
    });

    assert_eq!(e.policy_snapshot(), before);
}
