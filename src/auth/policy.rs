use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::warn;

use super::authenticator::Principal;
use crate::error::{ApiError, TOKEN_NOT_FOUND};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    RequiresAuth,
}

/// Every operation the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Signup,
    Login,
    ListUsers,
    GetUser,
    DeleteMe,
    CreatePost,
    ListPosts,
    SearchPosts,
    GetPost,
    EditPost,
    DeletePost,
}

impl Operation {
    #[cfg(test)]
    pub const ALL: [Operation; 11] = [
        Operation::Signup,
        Operation::Login,
        Operation::ListUsers,
        Operation::GetUser,
        Operation::DeleteMe,
        Operation::CreatePost,
        Operation::ListPosts,
        Operation::SearchPosts,
        Operation::GetPost,
        Operation::EditPost,
        Operation::DeletePost,
    ];

    pub const fn policy(self) -> AccessPolicy {
        match self {
            Operation::Signup | Operation::Login => AccessPolicy::Public,
            Operation::ListUsers
            | Operation::GetUser
            | Operation::DeleteMe
            | Operation::CreatePost
            | Operation::ListPosts
            | Operation::SearchPosts
            | Operation::GetPost
            | Operation::EditPost
            | Operation::DeletePost => AccessPolicy::RequiresAuth,
        }
    }
}

async fn require_principal(
    op: Operation,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if request.extensions().get::<Principal>().is_none() {
        warn!(operation = ?op, "anonymous request to protected operation");
        return Err(ApiError::AuthenticationFailed(TOKEN_NOT_FOUND));
    }
    Ok(next.run(request).await)
}

/// Attaches the access check `op` needs to its method route.
pub fn guarded<S>(op: Operation, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    match op.policy() {
        AccessPolicy::Public => route,
        AccessPolicy::RequiresAuth => route.route_layer(middleware::from_fn(
            move |request: Request, next: Next| require_principal(op, request, next),
        )),
    }
}
