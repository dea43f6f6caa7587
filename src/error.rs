use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use domain::DomainError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use tracing::{error, warn};

use crate::config::Settings;
use crate::schemas::{ErrorResponse, FieldError};

/// Detail of an internal error, carried on the response for [`render_error_details`].
#[derive(Debug, Clone)]
struct InternalDetail(String);

/// Every failure a handler can return. Rendered as [`ErrorResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Locked(String),

    /// The payload is the detail, never shown outside development.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        error!("Internal error: {}", detail);
        ApiError::Internal(detail)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Locked(_) => StatusCode::LOCKED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Locked(_) => "ACCOUNT_LOCKED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Database(db_err) => ApiError::from(db_err),
            DomainError::Validation(message) => ApiError::validation(message),
            DomainError::NotFound(message) => ApiError::NotFound(message),
            DomainError::Authorization(message) => ApiError::Forbidden(message),
            DomainError::Conflict(message) => ApiError::Conflict(message),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                warn!("Unique constraint violation: {}", detail);
                ApiError::Conflict("Resource already exists".to_string())
            }
            _ => ApiError::internal(format!("Database error: {err}")),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        warn!("Request validation failed on {} field(s)", fields.len());

        ApiError::Validation {
            message: "Invalid input data".to_string(),
            errors: fields,
        }
    }
}

impl ApiError {
    fn render(self, expose_detail: bool) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let code = self.code().to_string();

        let (errors, error) = match self {
            ApiError::Validation { errors, .. } if !errors.is_empty() => (Some(errors), None),
            ApiError::Internal(detail) if expose_detail => (None, Some(detail)),
            _ => (None, None),
        };

        let body = ErrorResponse {
            success: false,
            message,
            code,
            errors,
            error,
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = match &self {
            ApiError::Internal(detail) => Some(InternalDetail(detail.clone())),
            _ => None,
        };
        let mut response = self.render(false);
        if let Some(detail) = detail {
            response.extensions_mut().insert(detail);
        }
        response
    }
}

/// Re-renders internal errors with their detail when running in development.
pub async fn render_error_details(
    State(settings): State<Arc<Settings>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    match response.extensions_mut().remove::<InternalDetail>() {
        Some(InternalDetail(detail)) if settings.is_development() => {
            ApiError::Internal(detail).render(true)
        }
        _ => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (DomainError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (DomainError::Authorization("no".into()), StatusCode::FORBIDDEN),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                DomainError::Database(DbErr::Custom("boom".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn internal_error_hides_detail_in_message() {
        let err = ApiError::Internal("connection refused".into());
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    fn failing_app(environment: &str) -> axum_test::TestServer {
        let mut settings = Settings::for_tests();
        settings.environment = environment.to_string();
        let app = axum::Router::new()
            .route(
                "/boom",
                axum::routing::get(|| async { Err::<(), _>(ApiError::internal("disk on fire")) }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Arc::new(settings),
                render_error_details,
            ));
        axum_test::TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn internal_detail_follows_environment_of_the_app() {
        let development = failing_app("development");
        let production = failing_app("production");

        let response = development.get("/boom").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert_eq!(body.error.as_deref(), Some("disk on fire"));
        assert_eq!(body.code, "INTERNAL_ERROR");

        let response = production.get("/boom").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = response.json();
        assert!(body.error.is_none());
        assert_eq!(body.message, "Internal server error");
    }

    #[test]
    fn locked_is_423() {
        assert_eq!(ApiError::Locked("locked".into()).status_code().as_u16(), 423);
    }
}
