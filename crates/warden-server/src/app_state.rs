//! Shared application state for the warden server.

use std::sync::Arc;

use crate::config::WardenConfig;
use crate::notify::Notifier;
use crate::service::PolicyService;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    service: Arc<PolicyService>,
}

struct AppStateInner {
    cfg: WardenConfig,
    notifier: Notifier,
}

impl AppState {
    pub fn new(cfg: WardenConfig, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg, notifier }),
            service: Arc::new(PolicyService::new()),
        }
    }

    pub fn cfg(&self) -> &WardenConfig {
        &self.inner.cfg
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    pub fn service(&self) -> &PolicyService {
        &self.service
    }
}
