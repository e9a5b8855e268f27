//! Method dispatch for `POST /v1/casbin/:method`.
//!
//! Each method decodes its request shape from the body, calls the policy
//! service, and returns the reply as JSON. Unnamed convenience methods pass
//! their default rule-set type explicitly; the decoded request is never
//! rewritten.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use warden_core::error::{ClientCode, WardenError};

use super::rpc::*;
use crate::app_state::AppState;
use crate::registry::Handle;
use crate::service::RuleKind;

/// Error body: `{"code": "...", "msg": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] WardenError),
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::UnknownMethod(_) => (StatusCode::NOT_FOUND, ClientCode::NotFound.as_str()),
            ApiError::Core(e) => {
                let code = e.client_code();
                let status = match code {
                    ClientCode::NotFound => StatusCode::NOT_FOUND,
                    ClientCode::BadRequest | ClientCode::Construction => StatusCode::BAD_REQUEST,
                    ClientCode::Adapter => StatusCode::BAD_GATEWAY,
                    ClientCode::Eval => StatusCode::UNPROCESSABLE_ENTITY,
                    ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, code.as_str())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(code, error = %self, "call failed");
        } else {
            tracing::debug!(code, error = %self, "call rejected");
        }
        (status, Json(json!({ "code": code, "msg": self.to_string() }))).into_response()
    }
}

type ApiResult = std::result::Result<Response, ApiError>;

fn decode<T: DeserializeOwned>(body: &Bytes) -> std::result::Result<T, ApiError> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(raw).map_err(|e| {
        ApiError::Core(WardenError::BadRequest(format!(
            "invalid request body: {e}"
        )))
    })
}

fn reply<T: Serialize>(value: T) -> ApiResult {
    Ok(Json(value).into_response())
}

fn field_index(raw: i32) -> std::result::Result<usize, ApiError> {
    usize::try_from(raw).map_err(|_| {
        ApiError::Core(WardenError::BadRequest(format!(
            "field_index must be non-negative, got {raw}"
        )))
    })
}

fn named(kind: RuleKind, p_type: &str) -> &str {
    if p_type.is_empty() {
        kind.default_type()
    } else {
        p_type
    }
}

/// Named methods honour `p_type`; unnamed ones use the kind's default type.
fn rule_type<'a>(method: &str, kind: RuleKind, p_type: &'a str) -> &'a str {
    if method.contains("Named") {
        named(kind, p_type)
    } else {
        kind.default_type()
    }
}

/// `POST /v1/notify`: always accepted; delivery is best-effort.
pub async fn notify(State(app): State<AppState>, body: Bytes) -> ApiResult {
    let msg: Message = decode(&body)?;
    app.notifier().notify(msg.say);
    Ok((StatusCode::ACCEPTED, Json(EmptyReply {})).into_response())
}

pub async fn call(
    State(app): State<AppState>,
    Path(method): Path<String>,
    body: Bytes,
) -> ApiResult {
    let svc = app.service();
    tracing::debug!(%method, "call");

    match method.as_str() {
        // --------------------
        // Instances
        // --------------------
        "NewEnforcer" => {
            let req: NewEnforcerRequest = decode(&body)?;
            let handler = svc.new_enforcer(&req.model_text, req.adapter_handle).await?;
            reply(NewEnforcerReply { handler })
        }
        "NewAdapter" => {
            let req: NewAdapterRequest = decode(&body)?;
            let handler = svc.new_adapter(&req)?;
            reply(NewAdapterReply { handler })
        }

        // --------------------
        // Enforcement and persistence
        // --------------------
        "Enforce" => {
            let req: EnforceRequest = decode(&body)?;
            let res = svc.enforce(req.enforcer_handler, req.params.as_slice()).await?;
            reply(BoolReply { res })
        }
        "LoadPolicy" => {
            let req: EmptyRequest = decode(&body)?;
            svc.load_policy(req.handler).await?;
            reply(EmptyReply {})
        }
        "SavePolicy" => {
            let req: EmptyRequest = decode(&body)?;
            svc.save_policy(req.handler).await?;
            reply(EmptyReply {})
        }

        // --------------------
        // Field enumeration
        // --------------------
        "GetAllSubjects" | "GetAllObjects" | "GetAllActions" | "GetAllRoles" => {
            let req: EmptyRequest = decode(&body)?;
            let array = field_values(&app, &method, req.handler, None).await?;
            reply(ArrayReply { array })
        }
        "GetAllNamedSubjects" | "GetAllNamedObjects" | "GetAllNamedActions"
        | "GetAllNamedRoles" => {
            let req: SimpleGetRequest = decode(&body)?;
            let handle = req.enforcer_handler;
            let array = field_values(&app, &method, handle, Some(&req.p_type)).await?;
            reply(ArrayReply { array })
        }

        // --------------------
        // Rule-set reads
        // --------------------
        "GetPolicy" | "GetGroupingPolicy" => {
            let req: EmptyRequest = decode(&body)?;
            let kind = kind_of(&method);
            let rows = svc.get_rules(req.handler, kind, kind.default_type()).await?;
            reply(Array2DReply::from(rows))
        }
        "GetNamedPolicy" | "GetNamedGroupingPolicy" => {
            let req: PolicyRequest = decode(&body)?;
            let kind = kind_of(&method);
            let rows = svc
                .get_rules(req.enforcer_handler, kind, named(kind, &req.p_type))
                .await?;
            reply(Array2DReply::from(rows))
        }
        "GetFilteredPolicy" | "GetFilteredGroupingPolicy" | "GetFilteredNamedPolicy"
        | "GetFilteredNamedGroupingPolicy" => {
            let req: FilteredPolicyRequest = decode(&body)?;
            let kind = kind_of(&method);
            let ptype = rule_type(&method, kind, &req.p_type);
            let rows = svc
                .get_filtered_rules(
                    req.enforcer_handler,
                    kind,
                    ptype,
                    field_index(req.field_index)?,
                    &req.field_values,
                )
                .await?;
            reply(Array2DReply::from(rows))
        }
        "HasPolicy" | "HasGroupingPolicy" | "HasNamedPolicy" | "HasNamedGroupingPolicy" => {
            let req: PolicyRequest = decode(&body)?;
            let kind = kind_of(&method);
            let ptype = rule_type(&method, kind, &req.p_type);
            let res = svc
                .has_rule(req.enforcer_handler, kind, ptype, &req.params)
                .await?;
            reply(BoolReply { res })
        }

        // --------------------
        // Rule-set mutation
        // --------------------
        "AddPolicy" | "AddGroupingPolicy" | "AddNamedPolicy" | "AddNamedGroupingPolicy" => {
            let req: PolicyRequest = decode(&body)?;
            let kind = kind_of(&method);
            let ptype = rule_type(&method, kind, &req.p_type);
            let res = svc.add_rule(req.enforcer_handler, kind, ptype, req.params).await?;
            reply(BoolReply { res })
        }
        "RemovePolicy" | "RemoveGroupingPolicy" | "RemoveNamedPolicy"
        | "RemoveNamedGroupingPolicy" => {
            let req: PolicyRequest = decode(&body)?;
            let kind = kind_of(&method);
            let ptype = rule_type(&method, kind, &req.p_type);
            let res = svc
                .remove_rule(req.enforcer_handler, kind, ptype, &req.params)
                .await?;
            reply(BoolReply { res })
        }
        "RemoveFilteredPolicy" | "RemoveFilteredGroupingPolicy" | "RemoveFilteredNamedPolicy"
        | "RemoveFilteredNamedGroupingPolicy" => {
            let req: FilteredPolicyRequest = decode(&body)?;
            let kind = kind_of(&method);
            let ptype = rule_type(&method, kind, &req.p_type);
            let res = svc
                .remove_filtered_rules(
                    req.enforcer_handler,
                    kind,
                    ptype,
                    field_index(req.field_index)?,
                    &req.field_values,
                )
                .await?;
            reply(BoolReply { res })
        }

        // --------------------
        // RBAC
        // --------------------
        "GetRolesForUser" => {
            let req: UserRoleRequest = decode(&body)?;
            let array = svc.roles_for_user(req.enforcer_handler, &req.user).await?;
            reply(ArrayReply { array })
        }
        "GetUsersForRole" => {
            let req: UserRoleRequest = decode(&body)?;
            let array = svc.users_for_role(req.enforcer_handler, &req.role).await?;
            reply(ArrayReply { array })
        }
        "HasRoleForUser" => {
            let req: UserRoleRequest = decode(&body)?;
            let res = svc
                .has_role_for_user(req.enforcer_handler, &req.user, &req.role)
                .await?;
            reply(BoolReply { res })
        }
        "AddRoleForUser" => {
            let req: UserRoleRequest = decode(&body)?;
            let res = svc
                .add_role_for_user(req.enforcer_handler, &req.user, &req.role)
                .await?;
            reply(BoolReply { res })
        }
        "DeleteRoleForUser" => {
            let req: UserRoleRequest = decode(&body)?;
            let res = svc
                .delete_role_for_user(req.enforcer_handler, &req.user, &req.role)
                .await?;
            reply(BoolReply { res })
        }
        "DeleteRolesForUser" => {
            let req: UserRoleRequest = decode(&body)?;
            let res = svc.delete_roles_for_user(req.enforcer_handler, &req.user).await?;
            reply(BoolReply { res })
        }
        "DeleteUser" => {
            let req: UserRoleRequest = decode(&body)?;
            let res = svc.delete_user(req.enforcer_handler, &req.user).await?;
            reply(BoolReply { res })
        }
        "DeleteRole" => {
            let req: UserRoleRequest = decode(&body)?;
            svc.delete_role(req.enforcer_handler, &req.role).await?;
            reply(EmptyReply {})
        }
        "DeletePermission" => {
            let req: PermissionRequest = decode(&body)?;
            let res = svc.delete_permission(req.enforcer_handler, &req.permissions).await?;
            reply(BoolReply { res })
        }
        "AddPermissionForUser" => {
            let req: PermissionRequest = decode(&body)?;
            let res = svc
                .add_permission_for_user(req.enforcer_handler, &req.user, &req.permissions)
                .await?;
            reply(BoolReply { res })
        }
        "DeletePermissionForUser" => {
            let req: PermissionRequest = decode(&body)?;
            let res = svc
                .delete_permission_for_user(req.enforcer_handler, &req.user, &req.permissions)
                .await?;
            reply(BoolReply { res })
        }
        "DeletePermissionsForUser" => {
            let req: PermissionRequest = decode(&body)?;
            let res = svc
                .delete_permissions_for_user(req.enforcer_handler, &req.user)
                .await?;
            reply(BoolReply { res })
        }
        "GetPermissionsForUser" => {
            let req: PermissionRequest = decode(&body)?;
            let rows = svc.permissions_for_user(req.enforcer_handler, &req.user).await?;
            reply(Array2DReply::from(rows))
        }
        "HasPermissionForUser" => {
            let req: PermissionRequest = decode(&body)?;
            let res = svc
                .has_permission_for_user(req.enforcer_handler, &req.user, &req.permissions)
                .await?;
            reply(BoolReply { res })
        }

        _ => Err(ApiError::UnknownMethod(method.clone())),
    }
}

fn kind_of(method: &str) -> RuleKind {
    if method.contains("Grouping") {
        RuleKind::Grouping
    } else {
        RuleKind::Policy
    }
}

async fn field_values(
    app: &AppState,
    method: &str,
    handle: Handle,
    p_type: Option<&str>,
) -> std::result::Result<Vec<String>, ApiError> {
    let svc = app.service();
    let values = if method.ends_with("Roles") {
        let ptype = p_type.map_or("g", |p| named(RuleKind::Grouping, p));
        svc.all_roles(handle, ptype).await?
    } else {
        let ptype = p_type.map_or("p", |p| named(RuleKind::Policy, p));
        match method.trim_start_matches("GetAll").trim_start_matches("Named") {
            "Subjects" => svc.all_subjects(handle, ptype).await?,
            "Objects" => svc.all_objects(handle, ptype).await?,
            _ => svc.all_actions(handle, ptype).await?,
        }
    };
    Ok(values)
}
