//! sd-daemon library target.
//!
//! Exposes the router, state, config, and middleware for integration tests.
//! The binary `main.rs` depends on this library target.

pub mod api_types;
pub mod config;
pub mod middleware;
pub mod routes;
pub mod state;
