// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use plant_tracker_api::ErrorResponse;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    // === Repository errors ===
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Authentication errors ===
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),
    #[error("Session error: {0}")]
    SessionError(String),

    // === Internal errors ===
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, internal_detail) = self.get_error_info();

        if let Some(ref detail) = internal_detail {
            tracing::error!(error_code, %status, detail, "Request failed");
        }

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}

impl AppError {
    /// Status, stable code, public message and the detail kept for the logs
    fn get_error_info(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::IdentityProvider(msg) => (
                StatusCode::BAD_GATEWAY,
                "IDENTITY_PROVIDER_ERROR",
                "The identity provider could not complete the request".to_string(),
                Some(msg.clone()),
            ),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "An error occurred with the database".to_string(),
                Some(msg.clone()),
            ),
            AppError::SessionError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SESSION_ERROR",
                "An error occurred while saving the session".to_string(),
                Some(msg.clone()),
            ),
            AppError::InternalServerError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal server error occurred".to_string(),
                Some(msg.clone()),
            ),
        }
    }

    // === Helper constructors ===
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::InternalServerError(msg.into())
    }
}

// === Conversions ===

impl From<crate::db::error::RepositoryError> for AppError {
    fn from(err: crate::db::error::RepositoryError) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<crate::auth::session::SessionError> for AppError {
    fn from(err: crate::auth::session::SessionError) -> Self {
        AppError::SessionError(err.to_string())
    }
}

impl From<crate::auth::provider::OAuthError> for AppError {
    fn from(err: crate::auth::provider::OAuthError) -> Self {
        AppError::IdentityProvider(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::provider::OAuthError;
    use crate::db::error::RepositoryError;

    #[test]
    fn not_found_displays_correct_message() {
        let err = AppError::not_found("User");
        assert_eq!(err.to_string(), "Not found: User");
    }

    #[test]
    fn not_found_maps_to_404_status() {
        let response = AppError::not_found("test").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn identity_provider_error_maps_to_502_status() {
        let response = AppError::from(OAuthError::Denied).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn repository_error_becomes_database_error() {
        let err = AppError::from(RepositoryError::ConnectionError("down".to_string()));
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_into_response_sets_500_status() {
        let response = AppError::internal("boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
