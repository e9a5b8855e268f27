//! warden: handle-indexed policy enforcement.
//!
//! `warden::core` is the engine (model intake and a casbin-backed enforcer);
//! `warden::server` is the service layer and its HTTP transport. Most callers
//! only need the [`prelude`].

pub mod core {
    pub use warden_core::*;
}

pub mod server {
    pub use warden_server::*;
}

pub mod prelude {
    pub use warden_core::{ClientCode, Enforcer, PolicyLine, Result, WardenError};
    pub use warden_server::adapter::{Adapter, AdapterConfig};
    pub use warden_server::registry::Handle;
    pub use warden_server::service::{PolicyService, RuleKind, NO_ADAPTER};
}
