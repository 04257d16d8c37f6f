//! Unified error handling for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::uploads::UploadError;

/// Application-level error type for every screen.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Uploaded file rejected.
    #[error("{0}")]
    Upload(#[from] UploadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Visitor is not signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Visitor lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the visitor should be sent to the login page.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Api(ApiError::Unauthorized))
    }

    /// Message safe to show in a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Upload(err) => err.to_string(),
            Self::BadRequest(message) | Self::Forbidden(message) => message.clone(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::Unauthorized(_) => "Please sign in".to_string(),
            Self::Session(_) | Self::Template(_) | Self::Internal(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api(ApiError::Unauthorized) | Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Api(ApiError::Validation(_)) | Self::Upload(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Session(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Session(_) | Self::Template(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Api(ApiError::NotFound(_)) => "Not found".to_string(),
            Self::Api(_) => self.user_message(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Leave a breadcrumb for the request's Sentry event, if one is sent.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

/// Tag the Sentry scope with the signed-in dashboard user.
pub fn set_sentry_user(user_id: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order-123".to_string());
        assert_eq!(err.to_string(), "Not found: order-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Status {
                status: 500,
                message: "boom".to_string()
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Api(ApiError::Validation("Name is required".into()))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(AppError::Api(ApiError::Unauthorized).is_unauthorized());
        assert!(AppError::Unauthorized("no session".into()).is_unauthorized());
        assert!(!AppError::Forbidden("nope".into()).is_unauthorized());
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("db password wrong".to_string());
        assert_eq!(
            err.user_message(),
            "Something went wrong, please try again"
        );
    }
}
