//! Session resolution middleware.
//!
//! Every protected route runs [`require_user`], which resolves the session
//! token (from the `session` cookie or an `Authorization: Bearer` header) to
//! a user row and injects a [`CurrentUser`] request extension. Handlers take
//! the identity from that extension — there is no ambient "current user"
//! global. Requests without a valid session are redirected to `/auth/login`.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::entities::{SessionStore, UserStore};
use crate::error::ServerError;
use crate::state::AppState;

/// The authenticated identity, resolved once per request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

pub static SESSION_COOKIE: &str = "session";

pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let user = match resolve_user(&state, req.headers()).await {
        Ok(Some(user)) => user,
        Ok(None) => return ServerError::Unauthenticated.into_response(),
        Err(e) => return e.into_response(),
    };
    req.extensions_mut().insert(user);
    next.run(req).await
}

async fn resolve_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<CurrentUser>, ServerError> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };
    let Some(session) = state.store.find_session(&token).await? else {
        return Ok(None);
    };
    // A session row without its user means the row outlived an account; treat
    // it as unauthenticated rather than a server error.
    let Some(user) = state.store.find_user_by_id(session.user_id).await? else {
        return Ok(None);
    };
    Ok(Some(CurrentUser {
        id: user.id,
        username: user.username,
    }))
}

/// Extract the session token from the `Authorization: Bearer` header or the
/// `session` cookie, in that order.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }

    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies.split(';').find_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                (name == SESSION_COOKIE).then(|| value.to_owned())
            })
        })
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok-bearer"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=tok-cookie"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok-bearer"));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=tok-1; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok-1"));
    }

    #[test]
    fn no_credentials_yields_none() {
        assert!(session_token(&HeaderMap::new()).is_none());
    }
}
