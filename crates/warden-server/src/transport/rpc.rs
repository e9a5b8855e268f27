//! Request and reply messages.
//!
//! Missing request fields take their zero value (`adapter_handle` defaults to
//! -1, "no adapter"). Replies are always returned as the response body.

use serde::{Deserialize, Serialize};

use crate::adapter::AdapterConfig;
use crate::registry::Handle;
use crate::service::NO_ADAPTER;

fn no_adapter() -> Handle {
    NO_ADAPTER
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewEnforcerRequest {
    #[serde(default)]
    pub model_text: String,
    #[serde(default = "no_adapter")]
    pub adapter_handle: Handle,
}

/// Same fields as [`AdapterConfig`].
pub type NewAdapterRequest = AdapterConfig;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EnforceRequest {
    pub enforcer_handler: Handle,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EmptyRequest {
    pub handler: Handle,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyRequest {
    pub enforcer_handler: Handle,
    pub p_type: String,
    pub params: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SimpleGetRequest {
    pub enforcer_handler: Handle,
    pub p_type: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FilteredPolicyRequest {
    pub enforcer_handler: Handle,
    pub p_type: String,
    pub field_index: i32,
    pub field_values: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct UserRoleRequest {
    pub enforcer_handler: Handle,
    pub user: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PermissionRequest {
    pub enforcer_handler: Handle,
    pub user: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BoolReply {
    pub res: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ArrayReply {
    pub array: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Array2DRow {
    pub d1: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Array2DReply {
    pub d2: Vec<Array2DRow>,
}

impl From<Vec<Vec<String>>> for Array2DReply {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self {
            d2: rows.into_iter().map(|d1| Array2DRow { d1 }).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewEnforcerReply {
    pub handler: Handle,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NewAdapterReply {
    pub handler: Handle,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EmptyReply {}

/// Body of `POST /v1/notify`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Message {
    pub say: String,
}
