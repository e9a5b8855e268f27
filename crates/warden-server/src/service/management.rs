use warden_core::error::Result;

use super::{PolicyService, RuleKind};
use crate::registry::Handle;

impl PolicyService {
    /// Distinct values at one field position of a rule set.
    pub async fn field_values(
        &self,
        handle: Handle,
        kind: RuleKind,
        ptype: &str,
        field_index: usize,
    ) -> Result<Vec<String>> {
        let inst = self.instance(handle)?;
        let e = inst.enforcer.read().await;
        Ok(e.field_values(kind, ptype, field_index))
    }

    pub async fn all_subjects(&self, handle: Handle, ptype: &str) -> Result<Vec<String>> {
        self.field_values(handle, RuleKind::Policy, ptype, 0).await
    }

    pub async fn all_objects(&self, handle: Handle, ptype: &str) -> Result<Vec<String>> {
        self.field_values(handle, RuleKind::Policy, ptype, 1).await
    }

    pub async fn all_actions(&self, handle: Handle, ptype: &str) -> Result<Vec<String>> {
        self.field_values(handle, RuleKind::Policy, ptype, 2).await
    }

    pub async fn all_roles(&self, handle: Handle, ptype: &str) -> Result<Vec<String>> {
        self.field_values(handle, RuleKind::Grouping, ptype, 1).await
    }

    pub async fn get_rules(
        &self,
        handle: Handle,
        kind: RuleKind,
        ptype: &str,
    ) -> Result<Vec<Vec<String>>> {
        let inst = self.instance(handle)?;
        let e = inst.enforcer.read().await;
        Ok(e.get_rules(kind, ptype))
    }

    pub async fn get_filtered_rules(
        &self,
        handle: Handle,
        kind: RuleKind,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<Vec<Vec<String>>> {
        let inst = self.instance(handle)?;
        let e = inst.enforcer.read().await;
        Ok(e.get_filtered_rules(kind, ptype, field_index, field_values))
    }

    pub async fn has_rule(
        &self,
        handle: Handle,
        kind: RuleKind,
        ptype: &str,
        rule: &[String],
    ) -> Result<bool> {
        let inst = self.instance(handle)?;
        let e = inst.enforcer.read().await;
        Ok(e.has_rule(kind, ptype, rule))
    }

    /// Returns whether the rule was newly added.
    pub async fn add_rule(
        &self,
        handle: Handle,
        kind: RuleKind,
        ptype: &str,
        rule: Vec<String>,
    ) -> Result<bool> {
        let inst = self.instance(handle)?;
        let mut e = inst.enforcer.write().await;
        e.add_rule(kind, ptype, rule).await
    }

    /// Returns whether the rule was present.
    pub async fn remove_rule(
        &self,
        handle: Handle,
        kind: RuleKind,
        ptype: &str,
        rule: &[String],
    ) -> Result<bool> {
        let inst = self.instance(handle)?;
        let mut e = inst.enforcer.write().await;
        e.remove_rule(kind, ptype, rule).await
    }

    /// Returns whether any rule was removed.
    pub async fn remove_filtered_rules(
        &self,
        handle: Handle,
        kind: RuleKind,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<bool> {
        let inst = self.instance(handle)?;
        let mut e = inst.enforcer.write().await;
        e.remove_filtered_rules(kind, ptype, field_index, field_values)
            .await
    }
}
