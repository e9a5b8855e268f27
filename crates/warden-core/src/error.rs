//! Shared error type across warden crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Handle does not resolve to a live instance.
    NotFound,
    /// Instance could not be constructed.
    Construction,
    /// Persistence backend failed.
    Adapter,
    /// Matcher evaluation failed.
    Eval,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Construction => "CONSTRUCTION_ERROR",
            ClientCode::Adapter => "ADAPTER_ERROR",
            ClientCode::Eval => "EVAL_ERROR",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, WardenError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum WardenError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("{kind} not found: {handle}")]
    NotFound { kind: &'static str, handle: i64 },
    #[error("construction failed: {0}")]
    Construction(String),
    #[error("adapter: {0}")]
    Adapter(String),
    #[error("evaluation failed: {0}")]
    Eval(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl WardenError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            WardenError::BadRequest(_) => ClientCode::BadRequest,
            WardenError::NotFound { .. } => ClientCode::NotFound,
            WardenError::Construction(_) => ClientCode::Construction,
            WardenError::Adapter(_) => ClientCode::Adapter,
            WardenError::Eval(_) => ClientCode::Eval,
            WardenError::Internal(_) => ClientCode::Internal,
        }
    }
}
