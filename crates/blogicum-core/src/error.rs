//! Domain-level error types.

use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// A single field-level validation failure, reported back with the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        // HashMap iteration order is arbitrary
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        DomainError::Validation(fields)
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => DomainError::not_found("record", "requested"),
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Store connection error: {}", msg);
                DomainError::Internal("store unavailable".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Store query error: {}", msg);
                DomainError::Internal("store query failed".to_string())
            }
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_fields() {
        let err = DomainError::Validation(vec![
            FieldError::new("text", "too long"),
            FieldError::new("title", "required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: text: too long, title: required"
        );
    }

    #[test]
    fn test_repo_not_found_stays_not_found() {
        let err: DomainError = RepoError::NotFound.into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_repo_query_failure_becomes_internal() {
        let err: DomainError = RepoError::Query("boom".to_string()).into();
        assert!(matches!(err, DomainError::Internal(_)));
    }
}
