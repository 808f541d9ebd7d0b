use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{PostDetails, PostRequest, PostSummary, SearchQuery},
    repo::{NewPost, Post},
};
use crate::{
    auth::{
        guard::ensure_owner,
        policy::{guarded, Operation},
        Principal,
    },
    error::{ApiError, ApiResult, POST_NOT_FOUND},
    state::AppState,
    validation::{field, FieldError, FieldErrors},
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/post",
            guarded(Operation::CreatePost, post(create_post))
                .merge(guarded(Operation::ListPosts, get(list_posts))),
        )
        .route("/post/search", guarded(Operation::SearchPosts, get(search_posts)))
        .route(
            "/post/:id",
            guarded(Operation::GetPost, get(get_post))
                .merge(guarded(Operation::EditPost, put(edit_post)))
                .merge(guarded(Operation::DeletePost, delete(delete_post))),
        )
}

fn not_found() -> ApiError {
    ApiError::NotFound(POST_NOT_FOUND)
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse().map_err(|_| not_found())
}

/// Loads the post and checks the principal owns it. Existence is checked
/// first so a missing id is never reported as unauthorized.
async fn owned_post(state: &AppState, principal: &Principal, raw_id: &str) -> ApiResult<Post> {
    let id = parse_id(raw_id)?;
    let post = state.posts.find_by_id(id).await?.ok_or_else(not_found)?;
    ensure_owner(principal, post.user_id)?;
    Ok(post)
}

fn validate_post(payload: PostRequest) -> ApiResult<(String, String)> {
    let mut errors = FieldErrors::default();
    let title = errors.take(field("title", payload.title).non_blank().into_result());
    let content = errors.take(field("content", payload.content).non_blank().into_result());
    errors.finish()?;
    Ok((title, content))
}

#[instrument(skip(state, principal, payload), fields(user_id = principal.user.id))]
pub async fn create_post(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PostSummary>)> {
    let Json(payload) = payload?;
    let (title, content) = validate_post(payload)?;

    let post = state
        .posts
        .create(NewPost {
            user_id: principal.user.id,
            title,
            content,
        })
        .await?;

    info!(post_id = post.id, "post created");
    Ok((StatusCode::CREATED, Json(post.into())))
}

#[instrument(skip(state))]
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostDetails>>> {
    let posts = state.posts.list().await?;
    Ok(Json(posts.into_iter().map(PostDetails::from).collect()))
}

#[instrument(skip(state))]
pub async fn search_posts(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PostDetails>>> {
    let Query(query) = query?;
    let q = query
        .q
        .ok_or_else(|| ApiError::Validation(vec![FieldError::required("q")]))?;
    let posts = state.posts.find_matching(&q).await?;
    Ok(Json(posts.into_iter().map(PostDetails::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostDetails>> {
    let id = parse_id(&id)?;
    let post = state
        .posts
        .find_with_author(id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(post.into()))
}

#[instrument(skip(state, principal, payload), fields(user_id = principal.user.id))]
pub async fn edit_post(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
    payload: Result<Json<PostRequest>, JsonRejection>,
) -> ApiResult<Json<PostSummary>> {
    let post = owned_post(&state, &principal, &id).await?;

    let Json(payload) = payload?;
    let (title, content) = validate_post(payload)?;

    let updated = state
        .posts
        .update(post.id, &title, &content)
        .await?
        .ok_or_else(not_found)?;

    info!(post_id = updated.id, "post edited");
    Ok(Json(updated.into()))
}

#[instrument(skip(state, principal), fields(user_id = principal.user.id))]
pub async fn delete_post(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let post = owned_post(&state, &principal, &id).await?;
    state.posts.delete(post.id).await?;
    info!(post_id = post.id, "post deleted");
    Ok(StatusCode::NO_CONTENT)
}
