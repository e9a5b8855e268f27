//! warden server library entry.
//!
//! This crate wires configuration, the handle registries, persistence
//! adapters, the policy facades and the HTTP transport into one service. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod adapter;
pub mod app_state;
pub mod config;
pub mod notify;
pub mod ops;
pub mod registry;
pub mod router;
pub mod service;
pub mod transport;
