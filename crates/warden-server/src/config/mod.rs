//! Server config loader (strict parsing).

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use warden_core::error::{Result, WardenError};

pub use schema::{ServerSection, WardenConfig};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "WARDEN_CONFIG";
/// Config file read when [`CONFIG_ENV`] is unset.
pub const DEFAULT_PATH: &str = "warden.yaml";

pub fn load_from_file(path: &str) -> Result<WardenConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| WardenError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<WardenConfig> {
    let cfg: WardenConfig = serde_yaml::from_str(s)
        .map_err(|e| WardenError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve the config the binary runs with.
///
/// An explicit path must exist. The default path may be absent, in which case
/// built-in defaults apply.
pub fn load(explicit: Option<&str>) -> Result<WardenConfig> {
    match explicit {
        Some(path) => load_from_file(path),
        None => match fs::read_to_string(DEFAULT_PATH) {
            Ok(s) => load_from_str(&s),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = DEFAULT_PATH, "no config file, using defaults");
                Ok(WardenConfig::default())
            }
            Err(e) => Err(WardenError::Internal(format!("read config failed: {e}"))),
        },
    }
}
