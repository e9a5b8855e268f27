//! Persistence adapters for rule sets.
//!
//! Drivers:
//! - `file`: CSV policy file at `connect_string`
//! - `memory`: process-local store, starts empty

pub mod file;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use warden_core::error::{Result, WardenError};
use warden_core::PolicyLine;

pub use file::FileAdapter;
pub use memory::MemoryAdapter;

/// Rule-set persistence backend shared by every enforcer bound to it.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn driver(&self) -> &'static str;
    async fn load_policy(&self) -> Result<Vec<PolicyLine>>;
    async fn save_policy(&self, lines: &[PolicyLine]) -> Result<()>;
}

/// Adapter construction parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub adapter_name: String,
    pub driver_name: String,
    pub connect_string: String,
    pub db_specified: bool,
}

pub fn open(cfg: &AdapterConfig) -> Result<Arc<dyn Adapter>> {
    match cfg.driver_name.as_str() {
        "file" => {
            if cfg.connect_string.is_empty() {
                return Err(WardenError::Construction(
                    "file adapter needs a path in connect_string".into(),
                ));
            }
            Ok(Arc::new(FileAdapter::new(&cfg.connect_string)))
        }
        "memory" => Ok(Arc::new(MemoryAdapter::new())),
        other => Err(WardenError::Construction(format!(
            "unsupported adapter driver: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_selects_driver() {
        let mem = open(&AdapterConfig {
            driver_name: "memory".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(mem.driver(), "memory");

        let err = open(&AdapterConfig {
            driver_name: "mysql".into(),
            connect_string: "root:@tcp(127.0.0.1:3306)/".into(),
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, WardenError::Construction(_)));

        let err = open(&AdapterConfig {
            driver_name: "file".into(),
            ..Default::default()
        })
        .err()
        .unwrap();
        assert!(matches!(err, WardenError::Construction(_)));
    }
}
