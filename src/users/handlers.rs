use axum::{
    extract::{rejection::JsonRejection, FromRef, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{LoginRequest, PublicUser, SignupRequest, TokenResponse},
    repo::{NewUser, UserProfile},
};
use crate::{
    auth::{
        credentials::{self, issue_token},
        guard::ensure_owner,
        jwt::JwtKeys,
        password::hash_password,
        policy::{guarded, Operation},
        Principal,
    },
    error::{ApiError, ApiResult, USER_EXISTS, USER_NOT_FOUND},
    state::AppState,
    validation::{field, optional, FieldError, FieldErrors},
};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/user",
            guarded(Operation::Signup, post(signup))
                .merge(guarded(Operation::ListUsers, get(list_users))),
        )
        .route("/user/me", guarded(Operation::DeleteMe, delete(delete_me)))
        .route("/user/:id", guarded(Operation::GetUser, get(get_user)))
}

/// Login is reachable both at the root and under `/user`.
pub fn login_routes() -> Router<AppState> {
    Router::new()
        .route("/login", guarded(Operation::Login, post(login)))
        .route("/user/login", guarded(Operation::Login, post(login)))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let Json(payload) = payload?;
    let mut errors = FieldErrors::default();

    let display_name = errors.take(
        field("displayName", payload.display_name)
            .non_blank()
            .min_length(8)
            .into_result(),
    );

    let mut email = field("email", payload.email).non_blank().email().into_result();
    if let Ok(candidate) = &email {
        if state.users.exists_email(candidate).await? {
            email = Err(FieldError::message(USER_EXISTS));
        }
    }
    let email = errors.take(email);

    let password = errors.take(
        field("password", payload.password)
            .non_blank()
            .min_length(6)
            .into_result(),
    );
    let image = errors.take(optional("image", payload.image));
    errors.finish()?;

    let password_hash = hash_password(&password)?;
    // a concurrent signup can still win the race; the unique index reports it
    let user = state
        .users
        .create(NewUser {
            display_name,
            email,
            password_hash,
            image,
        })
        .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = issue_token(&keys, user.id)?;

    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(payload) = payload?;
    let mut errors = FieldErrors::default();
    let email = errors.take(field("email", payload.email).non_blank().into_result());
    let password = errors.take(field("password", payload.password).non_blank().into_result());
    errors.finish()?;

    let keys = JwtKeys::from_ref(&state);
    let token = credentials::login(state.users.as_ref(), &keys, &email, &password).await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PublicUser>> {
    let not_found = || ApiError::NotFound(USER_NOT_FOUND);
    let id: i64 = id.parse().map_err(|_| not_found())?;
    let user = state.users.find_by_id(id).await?.ok_or_else(not_found)?;
    Ok(Json(UserProfile::from(user).into()))
}

#[instrument(skip(state, principal), fields(user_id = principal.user.id))]
pub async fn delete_me(State(state): State<AppState>, principal: Principal) -> ApiResult<StatusCode> {
    let id = principal.user.id;
    ensure_owner(&principal, id)?;
    state.users.delete(id).await?;
    info!(user_id = id, "user deleted own account");
    Ok(StatusCode::NO_CONTENT)
}
