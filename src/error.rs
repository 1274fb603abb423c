use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::tokens::TokenError;
use crate::db::models::VoteKind;
use crate::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Username already exists, please login.")]
    DuplicateUsername,

    #[error("User and/or password is invalid.")]
    InvalidCredentials,

    #[error("You must be logged in to do that")]
    Unauthenticated,

    #[error("You are not allowed to modify this post")]
    Forbidden,

    #[error("{0} already exists")]
    DuplicateVote(VoteKind),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ForeignKeyViolation(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Pool(e) => AppError::Pool(e),
            RepositoryError::Sql(e) => AppError::Database(e),
            RepositoryError::UniqueViolation(detail) => AppError::Conflict(detail),
            RepositoryError::ForeignKeyViolation(detail) => AppError::ForeignKeyViolation(detail),
        }
    }
}

impl AppError {
    /// Domain failures travel in a 200 envelope; only token rejections and
    /// backend faults change the status line.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Token(TokenError::Signing(_) | TokenError::Lifetime(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Token(_) => StatusCode::UNAUTHORIZED,
            AppError::Database(_) | AppError::Pool(_) | AppError::Hash(_) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = json!({ "success": false, "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    fn response_status(err: AppError) -> StatusCode {
        let response = err.into_response();
        response.status()
    }

    #[tokio::test]
    async fn envelope_carries_the_message() {
        let response = AppError::NotFound("Post does not exist".into()).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Post does not exist");
    }

    #[test]
    fn domain_errors_return_200() {
        assert_eq!(response_status(AppError::DuplicateUsername), StatusCode::OK);
        assert_eq!(response_status(AppError::InvalidCredentials), StatusCode::OK);
        assert_eq!(response_status(AppError::Unauthenticated), StatusCode::OK);
        assert_eq!(
            response_status(AppError::DuplicateVote(VoteKind::Up)),
            StatusCode::OK
        );
    }

    #[test]
    fn rejected_token_returns_401() {
        assert_eq!(
            response_status(AppError::Token(TokenError::Expired)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn backend_fault_returns_500() {
        assert_eq!(
            response_status(AppError::Database(rusqlite::Error::QueryReturnedNoRows)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            response_status(AppError::Token(TokenError::Lifetime(u64::MAX))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn panicked_worker_returns_500() {
        let join_err = tokio::task::spawn_blocking(|| panic!("hash worker died"))
            .await
            .unwrap_err();
        assert_eq!(
            response_status(AppError::from(join_err)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn duplicate_vote_names_the_direction() {
        assert_eq!(
            AppError::DuplicateVote(VoteKind::Down).to_string(),
            "Downvote already exists"
        );
    }

    #[test]
    fn repository_constraints_map_to_domain_errors() {
        let err: AppError = RepositoryError::ForeignKeyViolation("FOREIGN KEY constraint failed".into()).into();
        assert!(matches!(err, AppError::ForeignKeyViolation(_)));
        assert_eq!(err.status(), StatusCode::OK);
    }
}
