use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::validation::FieldError;

pub const TOKEN_INVALID: &str = "Token expirado ou inválido";
pub const TOKEN_NOT_FOUND: &str = "Token não encontrado";
pub const NOT_OWNER: &str = "Usuário não autorizado";
pub const INVALID_CREDENTIALS: &str = "Campos inválidos";
pub const POST_NOT_FOUND: &str = "Post não existe";
pub const USER_NOT_FOUND: &str = "Usuário não existe";
pub const USER_EXISTS: &str = "User already exists";

pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure a request can end in, with its HTTP rendering.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    AuthenticationFailed(&'static str),

    #[error("Usuário não autorizado")]
    AuthorizationDenied,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Campos inválidos")]
    InvalidCredentials,

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Failures reported by the user/post stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => {
                ApiError::Validation(vec![FieldError::message(USER_EXISTS)])
            }
            StoreError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(errors)).into_response();
            }
            ApiError::AuthenticationFailed(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::AuthorizationDenied => (StatusCode::UNAUTHORIZED, NOT_OWNER),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InvalidCredentials => (StatusCode::BAD_REQUEST, INVALID_CREDENTIALS),
            ApiError::MalformedBody(ref detail) => {
                warn!(%detail, "rejected request body");
                (StatusCode::BAD_REQUEST, "Corpo da requisição inválido")
            }
            ApiError::MalformedQuery(ref detail) => {
                warn!(%detail, "rejected query string");
                (StatusCode::BAD_REQUEST, "Parâmetros de consulta inválidos")
            }
            ApiError::Internal(ref e) => {
                error!(error = ?e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Erro interno")
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
