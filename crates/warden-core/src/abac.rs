//! Request parameter translation.
//!
//! Parameter `i` binds to request token `i`. A parameter becomes an attribute
//! map when it carries [`ABAC_PREFIX`] or when the matcher reads attributes of
//! its token (`r.sub.Age`); otherwise it stays a plain string.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use casbin::EnforceArgs;
use regex::Regex;
use rhai::Dynamic;

use crate::error::{Result, WardenError};

/// Marks a parameter as a JSON attribute set.
pub const ABAC_PREFIX: &str = "ABAC::";

const ATTRIBUTE_ACCESS: &str = r"\br\.([A-Za-z_][A-Za-z0-9_]*)\.[A-Za-z_]";

/// How request parameters map onto the request definition.
#[derive(Debug, Clone)]
pub struct RequestShape {
    tokens: Vec<String>,
    structured: Vec<bool>,
}

impl RequestShape {
    pub fn new(tokens: &[String], matcher: &str) -> Result<Self> {
        let access = Regex::new(ATTRIBUTE_ACCESS)
            .map_err(|e| WardenError::Internal(format!("attribute pattern: {e}")))?;
        let roots: Vec<&str> = access
            .captures_iter(matcher)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();

        Ok(Self {
            tokens: tokens.to_vec(),
            structured: tokens.iter().map(|t| roots.contains(&t.as_str())).collect(),
        })
    }

    /// Whether the matcher reads attributes of the token at `slot`.
    pub fn is_structured(&self, slot: usize) -> bool {
        self.structured.get(slot).copied().unwrap_or(false)
    }
}

/// One translated call, ready for the casbin evaluator.
#[derive(Debug, Clone)]
pub struct RequestArgs {
    values: Vec<Dynamic>,
    key: u64,
}

impl RequestArgs {
    pub fn translate<S: AsRef<str>>(shape: &RequestShape, params: &[S]) -> Result<Self> {
        if params.len() != shape.tokens.len() {
            return Err(WardenError::BadRequest(format!(
                "expected {} request parameters ({}), got {}",
                shape.tokens.len(),
                shape.tokens.join(", "),
                params.len()
            )));
        }

        let mut hasher = DefaultHasher::new();
        let values = params
            .iter()
            .enumerate()
            .map(|(slot, raw)| {
                let raw = raw.as_ref();
                raw.hash(&mut hasher);
                let token = &shape.tokens[slot];
                match raw.strip_prefix(ABAC_PREFIX) {
                    Some(body) => parse_attrs(token, body),
                    None if shape.is_structured(slot) => parse_attrs(token, raw),
                    None => Ok(Dynamic::from(raw.to_string())),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            values,
            key: hasher.finish(),
        })
    }

    pub fn values(&self) -> &[Dynamic] {
        &self.values
    }
}

impl EnforceArgs for RequestArgs {
    fn try_into_vec(self) -> casbin::Result<Vec<Dynamic>> {
        Ok(self.values)
    }

    fn cache_key(&self) -> u64 {
        self.key
    }
}

fn parse_attrs(token: &str, body: &str) -> Result<Dynamic> {
    let json: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        WardenError::BadRequest(format!("parameter {token} is not valid JSON: {e}"))
    })?;
    if !json.is_object() {
        return Err(WardenError::BadRequest(format!(
            "parameter {token} must be a JSON object"
        )));
    }
    rhai::serde::to_dynamic(&json).map_err(|e| {
        WardenError::BadRequest(format!("parameter {token} has unsupported values: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(matcher: &str) -> RequestShape {
        let tokens: Vec<String> = ["sub", "obj", "act"].iter().map(|s| s.to_string()).collect();
        RequestShape::new(&tokens, matcher).unwrap()
    }

    #[test]
    fn plain_parameters_pass_through() {
        let shape = shape("r.sub == p.sub");
        let req = RequestArgs::translate(&shape, &["alice", "data1", "read"]).unwrap();
        assert_eq!(req.values()[0].clone().into_string().unwrap(), "alice");
        assert!(!shape.is_structured(0));
    }

    #[test]
    fn attribute_access_forces_json_parsing() {
        let shape = shape("r.sub.Age > 18 && r.obj == p.obj");
        assert!(shape.is_structured(0));
        assert!(!shape.is_structured(1));

        let req = RequestArgs::translate(&shape, &[r#"{"Age": 30}"#, "data1", "read"]).unwrap();
        assert!(req.values()[0].is_map());

        let err = RequestArgs::translate(&shape, &["alice", "data1", "read"]).unwrap_err();
        assert!(matches!(err, WardenError::BadRequest(_)));
    }

    #[test]
    fn prefix_marks_attribute_sets_anywhere() {
        let shape = shape("r.sub == p.sub");
        let params = ["alice", r#"ABAC::{"Owner":"alice"}"#, "read"];
        let req = RequestArgs::translate(&shape, &params).unwrap();
        assert!(req.values()[1].is_map());

        let err = RequestArgs::translate(&shape, &["alice", "ABAC::[1,2]", "read"]).unwrap_err();
        assert!(matches!(err, WardenError::BadRequest(_)));
    }

    #[test]
    fn parameter_count_must_match() {
        let shape = shape("r.sub == p.sub");
        let err = RequestArgs::translate(&shape, &["alice", "data1"]).unwrap_err();
        assert!(err.to_string().contains("expected 3"));
    }

    #[test]
    fn equal_params_share_a_cache_key() {
        let shape = shape("r.sub == p.sub");
        let a = RequestArgs::translate(&shape, &["alice", "data1", "read"]).unwrap();
        let b = RequestArgs::translate(&shape, &["alice", "data1", "read"]).unwrap();
        let c = RequestArgs::translate(&shape, &["bob", "data1", "read"]).unwrap();
        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), c.cache_key());
    }
}
