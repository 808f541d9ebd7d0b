use tracing::{info, warn};

use super::{jwt::JwtKeys, password::verify_password};
use crate::{
    error::{ApiError, ApiResult},
    users::repo::UserStore,
};

/// Signs a fresh token for `user_id`.
pub fn issue_token(keys: &JwtKeys, user_id: i64) -> ApiResult<String> {
    Ok(keys.issue(user_id)?)
}

/// Exchanges an email/password pair for a token.
///
/// The email must match exactly (case-sensitive). Unknown email and wrong
/// password are reported identically.
pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> ApiResult<String> {
    let Some(user) = users.find_by_email(email).await? else {
        warn!(%email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(keys, user.id)?;
    info!(user_id = user.id, "user logged in");
    Ok(token)
}
