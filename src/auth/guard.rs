use tracing::warn;

use super::authenticator::Principal;
use crate::error::{ApiError, ApiResult};

/// True iff the principal is the owner of the resource.
pub fn authorize_owner(principal: &Principal, owner_id: i64) -> bool {
    principal.user.id == owner_id
}

/// Ownership check for mutating routes. Callers must confirm the resource
/// exists first so a missing id reports not-found rather than unauthorized.
pub fn ensure_owner(principal: &Principal, owner_id: i64) -> ApiResult<()> {
    if authorize_owner(principal, owner_id) {
        Ok(())
    } else {
        warn!(user_id = principal.user.id, owner_id, "ownership check failed");
        Err(ApiError::AuthorizationDenied)
    }
}
