use tracing::{debug, warn};

use warden_core::error::Result;
use warden_core::Enforcer;

use super::PolicyService;
use crate::registry::Handle;

impl PolicyService {
    /// Decide one request under the shared lock.
    pub async fn enforce<S: AsRef<str>>(&self, handle: Handle, params: &[S]) -> Result<bool> {
        let inst = self.instance(handle)?;
        let enforcer = inst.enforcer.read().await;
        let allowed = enforcer.enforce(params)?;
        debug!(handle, allowed, "enforce");
        Ok(allowed)
    }

    /// Reload every rule from the bound adapter. The adapter is read and the
    /// replacement enforcer built without holding the instance lock; the swap
    /// itself is all-or-nothing.
    pub async fn load_policy(&self, handle: Handle) -> Result<()> {
        let inst = self.instance(handle)?;
        let adapter = inst.adapter()?;

        let lines = adapter.load_policy().await.map_err(|e| {
            warn!(handle, error = %e, "policy load failed");
            e
        })?;
        let model_text = inst.enforcer.read().await.model_text().to_string();
        let next = Enforcer::with_policy(&model_text, &lines).await.map_err(|e| {
            warn!(handle, error = %e, "policy rejected");
            e
        })?;

        *inst.enforcer.write().await = next;
        debug!(handle, rules = lines.len(), "policy loaded");
        Ok(())
    }

    /// Persist a snapshot of every rule through the bound adapter.
    pub async fn save_policy(&self, handle: Handle) -> Result<()> {
        let inst = self.instance(handle)?;
        let adapter = inst.adapter()?;

        let lines = inst.enforcer.read().await.policy_snapshot();
        adapter.save_policy(&lines).await?;
        debug!(handle, rules = lines.len(), "policy saved");
        Ok(())
    }
}
