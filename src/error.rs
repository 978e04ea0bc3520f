use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// One violated field in a validation failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// API error taxonomy. Everything a handler can fail with maps onto one of
/// these; the `IntoResponse` impl is the only place status codes and client
/// visible bodies are decided.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("email already registered")]
    DuplicateEmail,

    /// Unknown email and wrong password intentionally share this variant so
    /// the response cannot be used to probe which emails are registered.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Uniform rejection for every token failure mode (missing header, bad
    /// scheme, malformed, bad signature, expired, stale subject).
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<FieldError>>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::Validation(details) => ErrorBody {
                error: "Validation failed".into(),
                details: Some(details),
            },
            ApiError::DuplicateEmail => ErrorBody {
                error: "User with this email already exists".into(),
                details: None,
            },
            ApiError::InvalidCredentials => ErrorBody {
                error: "Invalid email or password".into(),
                details: None,
            },
            ApiError::Unauthorized => ErrorBody {
                error: "Unauthorized".into(),
                details: None,
            },
            ApiError::NotFound(what) => ErrorBody {
                error: format!("{what} not found"),
                details: None,
            },
            ApiError::Internal(e) => {
                // Log the real cause; the client only sees a generic message.
                error!(error = %e, "internal server error");
                ErrorBody {
                    error: "Internal server error".into(),
                    details: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

/// Unique-constraint violations are how the store reports email collisions;
/// a concurrent duplicate registration loses the race here rather than at
/// the pre-insert lookup.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = ApiError::Validation(vec![FieldError {
            field: "name",
            message: "Name must be between 2 and 50 characters",
        }]);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn duplicate_email_maps_to_bad_request() {
        assert_eq!(
            ApiError::DuplicateEmail.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn credential_and_token_failures_map_to_unauthorized() {
        assert_eq!(
            ApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            ApiError::NotFound("Todo").into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_hides_the_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to db at 10.0.0.3"));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
