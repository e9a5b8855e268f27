//! warden core: the policy engine.
//!
//! Model text is checked into a [`ModelShape`], then handed to casbin, which
//! owns matcher evaluation, effects and role links. An [`Enforcer`] wraps the
//! casbin enforcer with parameter translation and rule-set queries. Nothing in
//! here knows about handles, adapters or HTTP; `warden-server` adds those.
//!
//! Every fallible path returns [`WardenError`]. `unwrap`, `expect` and
//! `panic!` are denied outside tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod abac;
pub mod enforcer;
pub mod error;
pub mod model;
pub mod policy;

pub use enforcer::Enforcer;
/// Shared result type.
pub use error::{ClientCode, Result, WardenError};
pub use model::ModelShape;
pub use policy::{PolicyLine, RuleKind};
