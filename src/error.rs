//! Application error types.
//!
//! Every engine operation returns one of these. The HTTP layer maps each
//! variant onto a status code and error code; the variants themselves carry
//! no transport details.

use serde::Serialize;
use thiserror::Error;

/// Application-level errors returned by the services.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        operation: Option<String>,
    },

    /// Requested team, user or pull request does not exist.
    #[error("Not found: {resource}")]
    NotFound {
        resource: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Duplicate team name or pull request id.
    #[error("{resource} already exists: {id}")]
    AlreadyExists { resource: String, id: String },

    /// Mutation attempted on a pull request that is no longer open.
    #[error("Invalid transition: {message}")]
    InvalidTransition {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// The reviewer to replace is not assigned to the pull request.
    #[error("User {user_id} is not assigned to pull request {pull_request_id}")]
    NotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    /// No eligible reviewer candidate is available.
    #[error("No candidates available for reassignment")]
    NoCandidate {
        #[serde(skip_serializing_if = "Option::is_none")]
        pull_request_id: Option<String>,
    },

    /// A selected reviewer turned out to be inactive at commit time.
    #[error("Reviewer {user_id} is not active")]
    InactiveReviewer { user_id: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a database error with optional operation context.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: None,
        }
    }

    /// Create a database error with operation context.
    pub fn database_with_op(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            operation: Some(operation.into()),
        }
    }

    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: Some(id.into()),
        }
    }

    pub fn already_exists(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create the error returned when a merged pull request is mutated.
    pub fn pull_request_merged(pull_request_id: impl Into<String>) -> Self {
        Self::InvalidTransition {
            message: "cannot reassign merged pull request".to_string(),
            id: Some(pull_request_id.into()),
        }
    }

    pub fn not_assigned(pull_request_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::NotAssigned {
            pull_request_id: pull_request_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Create a no-candidate error without pull request context.
    pub fn no_candidate() -> Self {
        Self::NoCandidate {
            pull_request_id: None,
        }
    }

    /// Create a no-candidate error for a specific pull request.
    pub fn no_candidate_for(pull_request_id: impl Into<String>) -> Self {
        Self::NoCandidate {
            pull_request_id: Some(pull_request_id.into()),
        }
    }

    pub fn inactive_reviewer(user_id: impl Into<String>) -> Self {
        Self::InactiveReviewer {
            user_id: user_id.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this is a not found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Conversions from common error types

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::database(err.to_string())
    }
}

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::Migration(msg) => Self::database_with_op(msg, "migrate"),
            other => Self::database(other.to_string()),
        }
    }
}
