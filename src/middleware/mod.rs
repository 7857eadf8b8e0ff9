//! HTTP middleware stack: session auth, per-request tracing, CORS.

pub mod auth;
pub mod cors;
pub mod trace;
