use serde::Deserialize;
use warden_core::error::{Result, WardenError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WardenConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
        }
    }
}

impl WardenConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(WardenError::BadRequest(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.server.validate()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Capacity of the notification queue.
    #[serde(default = "default_notify_queue")]
    pub notify_queue: usize,

    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            notify_queue: default_notify_queue(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(WardenError::BadRequest(format!(
                "server.listen must be a socket address, got {}",
                self.listen
            )));
        }
        if !(1..=65_536).contains(&self.notify_queue) {
            return Err(WardenError::BadRequest(
                "server.notify_queue must be between 1 and 65536".into(),
            ));
        }
        if !(1024..=64 * 1024 * 1024).contains(&self.max_body_bytes) {
            return Err(WardenError::BadRequest(
                "server.max_body_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:50051".into()
}
fn default_notify_queue() -> usize {
    1024
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}
