//! HTTP API: server, routing, and session handling.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
