//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - Health / heartbeat route (public)
//! - `/auth` registration / login / logout routes (public)
//! - `/conversations` routes, guarded by the session middleware
//! - Outer layers: CORS and per-request trace-ID injection

mod auth;
mod conversations;
mod health;

use std::sync::Arc;

use axum::{Router, middleware};
use tower::ServiceBuilder;

use crate::middleware::{auth as session, cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let protected = conversations::router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        session::require_user,
    ));

    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(protected)
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}
