//! Role and permission calls composed from the rule-set primitives.
//!
//! Roles live in grouping rules `g = (user, role)`; permissions are policy
//! rules `p = (user-or-role, permission...)`.

use warden_core::error::Result;

use super::{PolicyService, RuleKind};
use crate::registry::Handle;

const ROLE_TYPE: &str = "g";
const PERMISSION_TYPE: &str = "p";

fn permission_rule(user: &str, permissions: &[String]) -> Vec<String> {
    std::iter::once(user.to_string())
        .chain(permissions.iter().cloned())
        .collect()
}

fn role_edge(user: &str, role: &str) -> Vec<String> {
    vec![user.to_string(), role.to_string()]
}

impl PolicyService {
    /// Roles granted directly to `user`.
    pub async fn roles_for_user(&self, handle: Handle, user: &str) -> Result<Vec<String>> {
        let inst = self.instance(handle)?;
        let e = inst.enforcer.read().await;
        Ok(e.roles_for_user(ROLE_TYPE, user))
    }

    /// Users holding `role` directly.
    pub async fn users_for_role(&self, handle: Handle, role: &str) -> Result<Vec<String>> {
        let inst = self.instance(handle)?;
        let e = inst.enforcer.read().await;
        Ok(e.users_for_role(ROLE_TYPE, role))
    }

    pub async fn has_role_for_user(&self, handle: Handle, user: &str, role: &str) -> Result<bool> {
        Ok(self
            .roles_for_user(handle, user)
            .await?
            .iter()
            .any(|r| r == role))
    }

    pub async fn add_role_for_user(&self, handle: Handle, user: &str, role: &str) -> Result<bool> {
        self.add_rule(handle, RuleKind::Grouping, ROLE_TYPE, role_edge(user, role))
            .await
    }

    pub async fn delete_role_for_user(
        &self,
        handle: Handle,
        user: &str,
        role: &str,
    ) -> Result<bool> {
        self.remove_rule(handle, RuleKind::Grouping, ROLE_TYPE, &role_edge(user, role))
            .await
    }

    pub async fn delete_roles_for_user(&self, handle: Handle, user: &str) -> Result<bool> {
        let user = [user.to_string()];
        self.remove_filtered_rules(handle, RuleKind::Grouping, ROLE_TYPE, 0, &user)
            .await
    }

    /// Removes the user's role edges only; policy rules naming the user stay.
    pub async fn delete_user(&self, handle: Handle, user: &str) -> Result<bool> {
        self.delete_roles_for_user(handle, user).await
    }

    /// Drops every grant of `role` and every permission held by it, under one lock.
    pub async fn delete_role(&self, handle: Handle, role: &str) -> Result<()> {
        let inst = self.instance(handle)?;
        let mut e = inst.enforcer.write().await;
        let role = [role.to_string()];
        e.remove_filtered_rules(RuleKind::Grouping, ROLE_TYPE, 1, &role)
            .await?;
        e.remove_filtered_rules(RuleKind::Policy, PERMISSION_TYPE, 0, &role)
            .await?;
        Ok(())
    }

    /// Removes every policy rule whose fields from index 1 match `permission`.
    pub async fn delete_permission(&self, handle: Handle, permission: &[String]) -> Result<bool> {
        self.remove_filtered_rules(handle, RuleKind::Policy, PERMISSION_TYPE, 1, permission)
            .await
    }

    pub async fn add_permission_for_user(
        &self,
        handle: Handle,
        user: &str,
        permission: &[String],
    ) -> Result<bool> {
        let rule = permission_rule(user, permission);
        self.add_rule(handle, RuleKind::Policy, PERMISSION_TYPE, rule)
            .await
    }

    pub async fn delete_permission_for_user(
        &self,
        handle: Handle,
        user: &str,
        permission: &[String],
    ) -> Result<bool> {
        let rule = permission_rule(user, permission);
        self.remove_rule(handle, RuleKind::Policy, PERMISSION_TYPE, &rule)
            .await
    }

    pub async fn delete_permissions_for_user(&self, handle: Handle, user: &str) -> Result<bool> {
        let user = [user.to_string()];
        self.remove_filtered_rules(handle, RuleKind::Policy, PERMISSION_TYPE, 0, &user)
            .await
    }

    pub async fn permissions_for_user(
        &self,
        handle: Handle,
        user: &str,
    ) -> Result<Vec<Vec<String>>> {
        let user = [user.to_string()];
        self.get_filtered_rules(handle, RuleKind::Policy, PERMISSION_TYPE, 0, &user)
            .await
    }

    pub async fn has_permission_for_user(
        &self,
        handle: Handle,
        user: &str,
        permission: &[String],
    ) -> Result<bool> {
        let rule = permission_rule(user, permission);
        self.has_rule(handle, RuleKind::Policy, PERMISSION_TYPE, &rule)
            .await
    }
}
