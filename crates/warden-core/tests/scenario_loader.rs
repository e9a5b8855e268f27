//! JSON enforcement scenarios shared by the engine tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde::Deserialize;

use warden_core::PolicyLine;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub description: String,
    pub model: String,
    #[serde(default)]
    pub policy: Vec<String>,
    pub requests: Vec<RequestCase>,
}

#[derive(Debug, Deserialize)]
pub struct RequestCase {
    pub params: Vec<String>,
    #[serde(default)]
    pub allow: Option<bool>,
    #[serde(default)]
    pub expect_error: Option<ExpectError>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectError {
    pub code: String,
}

impl Scenario {
    pub fn load(name: &str) -> Scenario {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/vectors")
            .join(name);
        let s = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
        serde_json::from_str(&s).unwrap()
    }

    pub fn policy_lines(&self) -> Vec<PolicyLine> {
        self.policy
            .iter()
            .filter_map(|l| PolicyLine::parse(l))
            .collect()
    }
}
