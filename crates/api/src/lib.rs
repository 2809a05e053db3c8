//! HTTP API: server wiring, routing, and request/response mapping for the
//! authentication endpoints.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
