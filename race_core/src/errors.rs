//! Definitions for error types used throughout core.

use crate::{
    AdapterError, DbError,
    utils::validation::{FieldError, ValidationErrors},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// database error
    #[error("database error: {0}")]
    Db(#[from] DbError),

    /// upstream adapter unavailable or misbehaving
    #[error("dependency error: {0}")]
    Dependency(AdapterError),

    /// Generic validation error of one field of an entity
    /// Returns the first error only
    #[error("field validation error: {0}")]
    Field(#[from] FieldError),

    /// Generic collected validation errors holding stringified field names.
    /// This works for ANY entity (Race, StartEntry, TimeEvent, etc.)
    #[error("validation error: {0:?}")]
    Validation(#[from] ValidationErrors),

    /// missing or rejected bearer token
    #[error("not authorized: {0}")]
    Auth(String),

    /// unknown id
    #[error("not found: {0}")]
    NotFound(String),

    /// the write would violate a cross-document invariant
    #[error("conflict: {0}")]
    Conflict(String),

    /// time event persisted with status Error but refused from the ranking
    #[error("time event rejected: {0}")]
    Rejected(String),

    /// unexpected invariant breakage
    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Map an adapter failure observed while serving a request: unknown
    /// upstream resources surface as NOT_FOUND, everything else as a
    /// dependency failure.
    pub fn from_adapter(err: AdapterError) -> Self {
        match err {
            AdapterError::NotFound(what) => CoreError::NotFound(what),
            other => CoreError::Dependency(other),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound(_))
    }
    pub fn get_field_error(&self) -> Option<&FieldError> {
        if let CoreError::Field(field_error) = self {
            Some(field_error)
        } else {
            None
        }
    }
}
