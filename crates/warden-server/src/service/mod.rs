//! Enforcement, management and RBAC facades over the handle registries.
//!
//! Every call resolves its target by handle first; an unknown handle is a
//! `NotFound` error and changes nothing. Each enforcer instance carries its own
//! read/write lock: enforcement and reads share it, rule-set mutations take it
//! exclusively.

mod enforce;
mod management;
mod rbac;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use warden_core::error::{Result, WardenError};
use warden_core::Enforcer;

use crate::adapter::{self, Adapter, AdapterConfig};
use crate::registry::{Handle, Registry};

pub use warden_core::RuleKind;

/// Adapter handle meaning "no adapter".
pub const NO_ADAPTER: Handle = -1;

/// One registered enforcer and the adapter it was created with.
pub struct EnforcerInstance {
    enforcer: RwLock<Enforcer>,
    adapter: Option<Arc<dyn Adapter>>,
}

impl EnforcerInstance {
    fn adapter(&self) -> Result<&Arc<dyn Adapter>> {
        self.adapter
            .as_ref()
            .ok_or_else(|| WardenError::Adapter("enforcer has no adapter".into()))
    }
}

pub struct PolicyService {
    enforcers: Registry<EnforcerInstance>,
    adapters: Registry<dyn Adapter>,
}

impl Default for PolicyService {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyService {
    pub fn new() -> Self {
        Self {
            enforcers: Registry::new("enforcer"),
            adapters: Registry::new("adapter"),
        }
    }

    /// Build an enforcer from model text, optionally bound to an adapter whose
    /// policy is loaded up front. No handle is allocated unless every step succeeds.
    pub async fn new_enforcer(&self, model_text: &str, adapter_handle: Handle) -> Result<Handle> {
        let adapter = match adapter_handle {
            NO_ADAPTER => None,
            h => Some(self.adapters.resolve(h)?),
        };

        let enforcer = match &adapter {
            None => Enforcer::new(model_text).await?,
            Some(adapter) => {
                let lines = adapter.load_policy().await.map_err(initial_load)?;
                Enforcer::with_policy(model_text, &lines)
                    .await
                    .map_err(|e| match e {
                        WardenError::Construction(_) => e,
                        other => initial_load(other),
                    })?
            }
        };

        let handle = self.enforcers.insert(Arc::new(EnforcerInstance {
            enforcer: RwLock::new(enforcer),
            adapter,
        }))?;
        info!(handle, adapter = adapter_handle, "enforcer created");
        Ok(handle)
    }

    pub fn new_adapter(&self, cfg: &AdapterConfig) -> Result<Handle> {
        let adapter = adapter::open(cfg)?;
        let driver = adapter.driver();
        let handle = self.adapters.insert(adapter)?;
        info!(handle, driver, name = %cfg.adapter_name, "adapter created");
        Ok(handle)
    }

    fn instance(&self, handle: Handle) -> Result<Arc<EnforcerInstance>> {
        self.enforcers.resolve(handle)
    }

    pub fn enforcer_count(&self) -> usize {
        self.enforcers.len()
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.len()
    }
}

fn initial_load(e: WardenError) -> WardenError {
    WardenError::Construction(format!("initial policy load: {e}"))
}
