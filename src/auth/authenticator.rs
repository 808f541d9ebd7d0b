use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::jwt::JwtKeys;
use crate::{
    error::{ApiError, ApiResult, TOKEN_INVALID, TOKEN_NOT_FOUND},
    state::AppState,
    users::repo::{User, UserStore},
};

/// The user a request is acting as, resolved from its token.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
}

/// Resolves the raw `Authorization` header value.
///
/// `Ok(None)` means anonymous: the header is absent or empty. The value may
/// be the bare token or `Bearer <token>`.
pub async fn authenticate(
    header: Option<&HeaderValue>,
    keys: &JwtKeys,
    users: &dyn UserStore,
) -> ApiResult<Option<Principal>> {
    let Some(header) = header else {
        return Ok(None);
    };
    let raw = header
        .to_str()
        .map_err(|_| {
            warn!("authorization header is not valid utf-8");
            ApiError::AuthenticationFailed(TOKEN_INVALID)
        })?
        .trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let token = raw
        .strip_prefix("Bearer ")
        .or_else(|| raw.strip_prefix("bearer "))
        .unwrap_or(raw)
        .trim();

    let user_id = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        ApiError::from(e)
    })?;

    let user = users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id, "token refers to a missing user");
        ApiError::AuthenticationFailed(TOKEN_NOT_FOUND)
    })?;

    debug!(user_id, "request authenticated");
    Ok(Some(Principal { user }))
}

/// Runs on every route: a bad token is rejected even where anonymous access
/// is allowed. A resolved principal is stored in the request extensions.
pub async fn resolve_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request.headers().get(AUTHORIZATION).cloned();
    let keys = JwtKeys::from_ref(&state);
    if let Some(principal) = authenticate(header.as_ref(), &keys, state.users.as_ref()).await? {
        request.extensions_mut().insert(principal);
    }
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(ApiError::AuthenticationFailed(TOKEN_NOT_FOUND))
    }
}
