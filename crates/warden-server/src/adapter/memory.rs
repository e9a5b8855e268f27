use async_trait::async_trait;
use tokio::sync::Mutex;

use warden_core::error::Result;
use warden_core::PolicyLine;

use super::Adapter;

/// Process-local store. Starts empty; holds whatever was last saved.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    lines: Mutex<Vec<PolicyLine>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    fn driver(&self) -> &'static str {
        "memory"
    }

    async fn load_policy(&self) -> Result<Vec<PolicyLine>> {
        Ok(self.lines.lock().await.clone())
    }

    async fn save_policy(&self, lines: &[PolicyLine]) -> Result<()> {
        *self.lines.lock().await = lines.to_vec();
        Ok(())
    }
}
