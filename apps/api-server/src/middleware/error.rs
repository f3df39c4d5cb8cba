//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use blogicum_core::DomainError;
use blogicum_core::error::RepoError;
use blogicum_core::ports::AuthError;
use blogicum_shared::{ErrorResponse, InvalidField};

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Validation errors: {0:?}")]
    Validation(Vec<InvalidField>),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Unauthorized => ErrorResponse::unauthorized(),
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Validation(fields) => ErrorResponse::unprocessable(fields.clone()),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{entity_type} {key} not found"))
            }
            DomainError::Validation(fields) => AppError::Validation(
                fields
                    .into_iter()
                    .map(|f| InvalidField {
                        field: f.field,
                        message: f.message,
                    })
                    .collect(),
            ),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        DomainError::from(err).into()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashingError(msg) => AppError::Internal(msg),
            _ => AppError::Unauthorized,
        }
    }
}

/// Body extractor errors. A form that does not deserialize is answered like one
/// that fails validation.
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match err {
        JsonPayloadError::Deserialize(e) => {
            let message = e.to_string();
            AppError::Validation(vec![InvalidField {
                field: rejected_field(&message),
                message,
            }])
        }
        other => AppError::BadRequest(other.to_string()),
    }
    .into()
}

/// Field name from serde's "missing field `x`" style messages, else `body`.
fn rejected_field(message: &str) -> String {
    ["missing field `", "unknown field `", "duplicate field `"]
        .iter()
        .find_map(|prefix| message.strip_prefix(prefix))
        .and_then(|rest| rest.split('`').next())
        .unwrap_or("body")
        .to_owned()
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use blogicum_core::FieldError;

    #[test]
    fn test_validation_maps_to_unprocessable() {
        let err = AppError::from(DomainError::Validation(vec![FieldError::new(
            "title",
            "must not be empty",
        )]));

        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        match err {
            AppError::Validation(fields) => assert_eq!(fields[0].field, "title"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_hidden_and_missing_share_not_found() {
        let err = AppError::from(DomainError::not_found("post", "42"));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_rejected_field_names_missing_field() {
        assert_eq!(
            rejected_field("missing field `title` at line 1 column 42"),
            "title"
        );
        assert_eq!(
            rejected_field("invalid type: integer `5`, expected a string"),
            "body"
        );
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let err = AppError::from(AuthError::TokenExpired);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    }
}
