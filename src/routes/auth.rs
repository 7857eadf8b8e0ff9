//! Registration, login, and logout.
//!
//! A successful login creates a server-side session row and hands the token
//! back twice: as an HttpOnly `session` cookie and in the JSON body for
//! clients that prefer an `Authorization: Bearer` header.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::entities::{SessionStore, UserStore};
use crate::error::ServerError;
use crate::middleware::auth::{SESSION_COOKIE, session_token};
use crate::password;
use crate::schemas::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::state::AppState;

/// Register auth routes (all public; logout resolves its own token).
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, ServerError> {
    if req.username.is_empty() {
        return Err(ServerError::Validation("Username is required.".into()));
    }
    if req.password.is_empty() {
        return Err(ServerError::Validation("Password is required.".into()));
    }

    let hash = password::hash_password(&req.password);
    let id = match state.store.create_user(&req.username, &hash).await {
        Ok(id) => id,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(ServerError::Validation(format!(
                "User {} is already registered.",
                req.username
            )));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = id, username = %req.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "username": req.username })),
    )
        .into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ServerError> {
    let Some(user) = state.store.find_user_by_username(&req.username).await? else {
        return Err(ServerError::Validation("Incorrect username.".into()));
    };
    if !password::verify_password(&req.password, &user.password_hash) {
        return Err(ServerError::Validation("Incorrect password.".into()));
    }

    let token = Uuid::new_v4().to_string();
    state.store.create_session(&token, user.id).await?;
    info!(user_id = user.id, "login");

    let cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly");
    let mut response = Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
    })
    .into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|e| ServerError::Internal(format!("invalid session cookie: {e}")))?,
    );
    Ok(response)
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if let Some(token) = session_token(&headers) {
        state.store.delete_session(&token).await?;
    }

    // Expire the cookie regardless of whether a session row existed.
    let mut response = Json(json!({ "logged_out": true })).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; Max-Age=0"),
    );
    Ok(response)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
