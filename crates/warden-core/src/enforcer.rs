//! Enforcer: a casbin enforcer plus the model facts the service needs.

use std::fmt;

use casbin::{CoreApi, DefaultModel, MemoryAdapter, MgmtApi};
use tracing::debug;

use crate::abac::{RequestArgs, RequestShape};
use crate::error::{Result, WardenError};
use crate::model::ModelShape;
use crate::policy::{distinct_field, matches_filter, PolicyLine, RuleKind};

/// Policy enforcement engine for one model.
///
/// Evaluation is delegated to casbin. Rule-set reads and role queries are
/// answered from its stored rules, so none of them need `&mut self`.
pub struct Enforcer {
    inner: casbin::Enforcer,
    shape: ModelShape,
    request: RequestShape,
    model_text: String,
}

impl fmt::Debug for Enforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enforcer")
            .field("shape", &self.shape)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl Enforcer {
    /// Build an enforcer with empty rule sets.
    pub async fn new(model_text: &str) -> Result<Self> {
        let shape = ModelShape::scan(model_text)?;
        let request = RequestShape::new(shape.request_tokens(), shape.matcher())?;

        let model = DefaultModel::from_str(model_text)
            .await
            .map_err(|e| WardenError::Construction(format!("model: {e}")))?;
        let mut inner = casbin::Enforcer::new(model, MemoryAdapter::default())
            .await
            .map_err(|e| WardenError::Construction(format!("enforcer: {e}")))?;
        inner.enable_auto_save(false);

        Ok(Self {
            inner,
            shape,
            request,
            model_text: model_text.to_string(),
        })
    }

    /// Build an enforcer and load `lines` into it. A line naming a rule-set
    /// type the model does not declare fails the whole build.
    pub async fn with_policy(model_text: &str, lines: &[PolicyLine]) -> Result<Self> {
        let mut enforcer = Self::new(model_text).await?;
        for line in lines {
            let kind = line
                .kind()
                .filter(|kind| enforcer.shape.has_type(*kind, &line.ptype))
                .ok_or_else(|| {
                    WardenError::Adapter(format!("policy line uses unknown type {}", line.ptype))
                })?;
            enforcer.add_rule(kind, &line.ptype, line.rule.clone()).await?;
        }
        debug!(rules = lines.len(), "policy loaded");
        Ok(enforcer)
    }

    pub fn model_text(&self) -> &str {
        &self.model_text
    }

    /// Decide one request. Parameters follow the request definition order.
    pub fn enforce<S: AsRef<str>>(&self, params: &[S]) -> Result<bool> {
        let args = RequestArgs::translate(&self.request, params)?;
        let allowed = self
            .inner
            .enforce(args)
            .map_err(|e| WardenError::Eval(e.to_string()))?;
        debug!(allowed, "enforce decided");
        Ok(allowed)
    }

    // --------------------
    // Rule-set reads
    // --------------------

    pub fn get_rules(&self, kind: RuleKind, ptype: &str) -> Vec<Vec<String>> {
        if !self.shape.has_type(kind, ptype) {
            return Vec::new();
        }
        match kind {
            RuleKind::Policy => self.inner.get_named_policy(ptype),
            RuleKind::Grouping => self.inner.get_named_grouping_policy(ptype),
        }
    }

    pub fn get_filtered_rules(
        &self,
        kind: RuleKind,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Vec<Vec<String>> {
        self.get_rules(kind, ptype)
            .into_iter()
            .filter(|rule| matches_filter(rule, field_index, field_values))
            .collect()
    }

    pub fn has_rule(&self, kind: RuleKind, ptype: &str, rule: &[String]) -> bool {
        self.get_rules(kind, ptype).iter().any(|r| r == rule)
    }

    /// Distinct values at one field position, in first-seen order.
    pub fn field_values(&self, kind: RuleKind, ptype: &str, field_index: usize) -> Vec<String> {
        distinct_field(&self.get_rules(kind, ptype), field_index)
    }

    // --------------------
    // Rule-set mutation
    // --------------------

    /// Append unless already present. Returns whether the rule was added.
    pub async fn add_rule(
        &mut self,
        kind: RuleKind,
        ptype: &str,
        rule: Vec<String>,
    ) -> Result<bool> {
        if !self.shape.has_type(kind, ptype) || rule.is_empty() {
            return Ok(false);
        }
        if kind == RuleKind::Grouping && rule.len() < 2 {
            return Err(WardenError::BadRequest(format!(
                "grouping rule needs at least 2 fields, got {}",
                rule.len()
            )));
        }
        if self.has_rule(kind, ptype, &rule) {
            return Ok(false);
        }
        let added = match kind {
            RuleKind::Policy => self.inner.add_named_policy(ptype, rule).await,
            RuleKind::Grouping => self.inner.add_named_grouping_policy(ptype, rule).await,
        };
        added.map_err(|e| WardenError::Internal(format!("add {ptype} rule: {e}")))
    }

    /// Remove the exact rule. Returns whether it was present.
    pub async fn remove_rule(
        &mut self,
        kind: RuleKind,
        ptype: &str,
        rule: &[String],
    ) -> Result<bool> {
        if !self.has_rule(kind, ptype, rule) {
            return Ok(false);
        }
        let rule = rule.to_vec();
        let removed = match kind {
            RuleKind::Policy => self.inner.remove_named_policy(ptype, rule).await,
            RuleKind::Grouping => self.inner.remove_named_grouping_policy(ptype, rule).await,
        };
        removed.map_err(|e| WardenError::Internal(format!("remove {ptype} rule: {e}")))
    }

    /// Remove every rule matching the filter. Returns whether any rule was removed.
    pub async fn remove_filtered_rules(
        &mut self,
        kind: RuleKind,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<bool> {
        let mut removed = false;
        for rule in self.get_filtered_rules(kind, ptype, field_index, field_values) {
            removed |= self.remove_rule(kind, ptype, &rule).await?;
        }
        Ok(removed)
    }

    /// Every loaded rule as persisted lines, policy types first.
    pub fn policy_snapshot(&self) -> Vec<PolicyLine> {
        [RuleKind::Policy, RuleKind::Grouping]
            .into_iter()
            .flat_map(move |kind| {
                self.shape.types(kind).iter().flat_map(move |ptype| {
                    self.get_rules(kind, ptype)
                        .into_iter()
                        .map(move |rule| PolicyLine::new(ptype.clone(), rule))
                })
            })
            .collect()
    }

    // --------------------
    // Role queries
    // --------------------

    /// Direct roles of `name` under role definition `ptype`.
    pub fn roles_for_user(&self, ptype: &str, name: &str) -> Vec<String> {
        let edges = self.get_filtered_rules(RuleKind::Grouping, ptype, 0, &[name.to_string()]);
        distinct_field(&edges, 1)
    }

    /// Direct members of role `name` under role definition `ptype`.
    pub fn users_for_role(&self, ptype: &str, name: &str) -> Vec<String> {
        let edges = self.get_filtered_rules(RuleKind::Grouping, ptype, 1, &[name.to_string()]);
        distinct_field(&edges, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RBAC: &str = "[request_definition]\nr = sub, obj, act\n\
        [policy_definition]\np = sub, obj, act\n\
        [role_definition]\ng = _, _\n\
        [policy_effect]\ne = some(where (p.eft == allow))\n\
        [matchers]\nm = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act";

    fn rule(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[tokio::test]
    async fn role_rules_take_effect_immediately() {
        let mut e = Enforcer::new(RBAC).await.unwrap();
        let grant = rule(&["admin", "data1", "write"]);
        assert!(e.add_rule(RuleKind::Policy, "p", grant).await.unwrap());
        assert!(!e.enforce(&["alice", "data1", "write"]).unwrap());

        let edge = rule(&["alice", "admin"]);
        assert!(e.add_rule(RuleKind::Grouping, "g", edge.clone()).await.unwrap());
        assert!(e.enforce(&["alice", "data1", "write"]).unwrap());

        assert!(e.remove_rule(RuleKind::Grouping, "g", &edge).await.unwrap());
        assert!(!e.enforce(&["alice", "data1", "write"]).unwrap());
    }

    #[tokio::test]
    async fn add_is_idempotent_and_unknown_types_are_no_ops() {
        let mut e = Enforcer::new(RBAC).await.unwrap();
        let r = rule(&["carol", "data3", "read"]);
        assert!(e.add_rule(RuleKind::Policy, "p", r.clone()).await.unwrap());
        assert!(!e.add_rule(RuleKind::Policy, "p", r.clone()).await.unwrap());
        assert_eq!(e.get_rules(RuleKind::Policy, "p"), vec![r.clone()]);

        assert!(!e.add_rule(RuleKind::Policy, "p9", r.clone()).await.unwrap());
        assert!(!e.remove_rule(RuleKind::Grouping, "g3", &r).await.unwrap());
        assert!(e.get_rules(RuleKind::Policy, "p9").is_empty());

        let short = e.add_rule(RuleKind::Grouping, "g", rule(&["alone"])).await;
        assert!(matches!(short, Err(WardenError::BadRequest(_))));
    }

    #[tokio::test]
    async fn remove_filtered_touches_only_matching_field() {
        let mut e = Enforcer::new(RBAC).await.unwrap();
        for r in [
            rule(&["alice", "data1", "read"]),
            rule(&["alice", "data2", "write"]),
            rule(&["bob", "data1", "read"]),
        ] {
            e.add_rule(RuleKind::Policy, "p", r).await.unwrap();
        }

        let alice = rule(&["alice"]);
        assert!(e.remove_filtered_rules(RuleKind::Policy, "p", 0, &alice).await.unwrap());
        assert_eq!(e.get_rules(RuleKind::Policy, "p"), vec![rule(&["bob", "data1", "read"])]);
        assert!(!e.remove_filtered_rules(RuleKind::Policy, "p", 0, &alice).await.unwrap());
    }

    #[tokio::test]
    async fn construction_rejects_malformed_models() {
        let missing_matcher = RBAC.replace("[matchers]\nm = ", "[matchers]\n# ");
        let err = Enforcer::new(&missing_matcher).await.unwrap_err();
        assert!(matches!(err, WardenError::Construction(_)));

        let deep = format!(
            "{}r.sub == p.sub{}",
            "(".repeat(100_000),
            ")".repeat(100_000)
        );
        let nested = RBAC.replace("g(r.sub, p.sub)", &deep);
        let err = Enforcer::new(&nested).await.unwrap_err();
        assert!(matches!(err, WardenError::Construction(_)));
    }

    #[tokio::test]
    async fn extended_matcher_functions_are_available() {
        let model = RBAC.replace(
            "g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act",
            "r.sub == p.sub && keyMatch3(r.obj, p.obj) && globMatch(r.act, p.act)",
        );
        let policy = [PolicyLine::new("p", rule(&["alice", "/books/{id}", "r*"]))];
        let e = Enforcer::with_policy(&model, &policy).await.unwrap();

        assert!(e.enforce(&["alice", "/books/42", "read"]).unwrap());
        assert!(!e.enforce(&["alice", "/books/42/pages", "read"]).unwrap());
        assert!(!e.enforce(&["alice", "/books/42", "write"]).unwrap());
    }

    #[tokio::test]
    async fn with_policy_rejects_unknown_types() {
        let lines = vec![
            PolicyLine::new("p", rule(&["alice", "data1", "read"])),
            PolicyLine::new("x", rule(&["oops"])),
        ];
        let err = Enforcer::with_policy(RBAC, &lines).await.unwrap_err();
        assert!(matches!(err, WardenError::Adapter(_)));

        let good = vec![
            PolicyLine::new("p", rule(&["admin", "data1", "read"])),
            PolicyLine::new("g", rule(&["alice", "admin"])),
        ];
        let e = Enforcer::with_policy(RBAC, &good).await.unwrap();
        assert!(e.enforce(&["alice", "data1", "read"]).unwrap());
        assert!(!e.enforce(&["bob", "data1", "read"]).unwrap());
        assert_eq!(e.policy_snapshot(), good);
    }

    #[tokio::test]
    async fn direct_role_queries() {
        let mut e = Enforcer::new(RBAC).await.unwrap();
        e.add_rule(RuleKind::Grouping, "g", rule(&["alice", "admin"])).await.unwrap();
        e.add_rule(RuleKind::Grouping, "g", rule(&["admin", "root"])).await.unwrap();
        assert_eq!(e.roles_for_user("g", "alice"), vec!["admin"]);
        assert_eq!(e.users_for_role("g", "admin"), vec!["alice"]);
        assert!(e.roles_for_user("g2", "alice").is_empty());
    }
}
