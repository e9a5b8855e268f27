//! HTTP/JSON transport.
//!
//! - `rpc`: request/reply message shapes
//! - `http`: method dispatch and error mapping

pub mod http;
pub mod rpc;
