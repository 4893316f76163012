//! Authentication middleware layers for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::jwt;
use super::types::{AuthUser, NewProfile};

/// Middleware that requires a valid user token. A user without a profile
/// row gets one built from the token's signup details.
///
/// Use with `axum::middleware::from_fn_with_state`. The caller is available
/// to handlers as `Extension<AuthUser>`.
pub async fn require_user(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Middleware that requires the caller's profile to have the admin role.
pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    match authenticate_admin(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Admin access, or the static trigger token used by an external timer.
pub async fn require_admin_or_trigger(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_header(request.headers()) {
        if state.auth.is_trigger_token(&token) {
            tracing::debug!("Request authorized by trigger token");
            return next.run(request).await;
        }
    }

    match authenticate_admin(&state, request.headers()).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> ApiResult<AuthUser> {
    let token = extract_token_from_header(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing authentication".to_string()))?;

    let claims = jwt::validate_token(&state.auth, &token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    let mut conn = state.pool.get().await?;
    let profile = match db::profiles::get_by_id(&mut conn, claims.sub).await? {
        Some(profile) => profile,
        None => {
            tracing::info!("Creating profile for new user {}", claims.sub);
            db::profiles::insert_if_absent(&mut conn, &NewProfile::from_claims(&claims)).await?
        }
    };

    Ok(AuthUser {
        id: claims.sub,
        profile,
    })
}

async fn authenticate_admin(state: &AppState, headers: &HeaderMap) -> ApiResult<AuthUser> {
    let user = authenticate(state, headers).await?;
    if !user.is_admin() {
        tracing::warn!("Non-admin {} attempted an admin operation", user.id);
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    Ok(user)
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token_from_header(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(extract_token_from_header(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_token_from_header(&headers).is_none());
    }
}
