use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::{error, warn};

use service::auth::domain::{AuthSession, AuthUser, Claims, LoginInput};
use service::ServiceError;

use crate::errors::ApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<AuthSession>), ApiError> {
    let session = state.auth.login(input).await?;
    if let Err(e) = state.profile.record_login(Utc::now()).await {
        warn!(error = %e, "could not record last login");
    }
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(session)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<AppState>, Extension(claims): Extension<Claims>) -> Result<Json<AuthUser>, ApiError> {
    let user = state.auth.find_user(claims.uid).await?;
    Ok(Json(user))
}

/// Bearer header first, then the `auth_token` cookie.
fn bearer_token(req: &Request) -> Result<Option<String>, ApiError> {
    let path = req.uri().path();
    if let Some(h) = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => {
                warn!(%path, "invalid Authorization format (expect Bearer)");
                Err(ApiError(ServiceError::Unauthorized("invalid authorization header".into())))
            }
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// Guard for `/api/*` and `/auth/me`: a missing token is a bad request, a
/// malformed or expired one is unauthorized. Verified claims are handed to
/// handlers as a request extension.
pub async fn require_bearer_token(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }
    let Some(token) = bearer_token(&req)? else {
        warn!(path = %req.uri().path(), "missing Authorization header and auth_token cookie");
        return Err(ApiError(ServiceError::Validation("missing bearer token".into())));
    };
    match state.auth.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            error!(path = %req.uri().path(), err = %e, "token validation failed");
            Err(ApiError(ServiceError::Unauthorized("invalid or expired token".into())))
        }
    }
}
