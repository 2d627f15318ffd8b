//! `docvault` HTTP server.
//!
//! Wires the core library and the mock gateways into a running Axum
//! server: a wallet-gated JSON API at `/v1/*` over the in-memory
//! document registry.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
