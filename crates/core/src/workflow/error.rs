//! Workflow error types for the form approval lifecycle.

use thiserror::Error;
use uuid::Uuid;

use cashdesk_shared::AppError;

use crate::workflow::types::{Stage, StageStatus};

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A later stage was attempted before a prior stage was released.
    #[error("cannot decide {attempted} stage: {required} stage has not been released")]
    StageNotReleased {
        /// The prerequisite stage that is not released.
        required: Stage,
        /// The stage the caller tried to decide.
        attempted: Stage,
    },

    /// The stage has already been released or rejected.
    #[error("{stage} stage has already been decided ({status})")]
    StageAlreadyDecided {
        /// The stage that was already decided.
        stage: Stage,
        /// Its current status.
        status: StageStatus,
    },

    /// The owner tried to edit a form after the accountant released it.
    #[error("form is read-only after accountant release")]
    FormLocked,

    /// The form's branch is not in the caller's assigned set.
    #[error("branch {branch_id} is not in the caller's assigned branches")]
    BranchNotAssigned {
        /// The branch the caller tried to act on.
        branch_id: Uuid,
    },

    /// The caller's role does not grant the attempted operation.
    #[error("role {role} is not permitted to {operation}")]
    RoleNotPermitted {
        /// The caller's role.
        role: String,
        /// A short description of the operation.
        operation: String,
    },

    /// Form not found.
    #[error("form {0} not found")]
    FormNotFound(Uuid),

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::StageNotReleased { .. } => 422,
            Self::StageAlreadyDecided { .. } => 409,
            Self::FormLocked | Self::BranchNotAssigned { .. } | Self::RoleNotPermitted { .. } => {
                403
            }
            Self::FormNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::StageNotReleased { .. } => "STAGE_NOT_RELEASED",
            Self::StageAlreadyDecided { .. } => "STAGE_ALREADY_DECIDED",
            Self::FormLocked => "FORM_LOCKED",
            Self::BranchNotAssigned { .. } => "BRANCH_NOT_ASSIGNED",
            Self::RoleNotPermitted { .. } => "ROLE_NOT_PERMITTED",
            Self::FormNotFound(_) => "FORM_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err {
            WorkflowError::StageNotReleased { .. } => Self::Precondition(message),
            WorkflowError::StageAlreadyDecided { .. } => Self::Conflict(message),
            WorkflowError::FormLocked
            | WorkflowError::BranchNotAssigned { .. }
            | WorkflowError::RoleNotPermitted { .. } => Self::Forbidden(message),
            WorkflowError::FormNotFound(_) => Self::NotFound(message),
            WorkflowError::Database(message) => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_not_released_error() {
        let err = WorkflowError::StageNotReleased {
            required: Stage::Accountant,
            attempted: Stage::BranchManager,
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.error_code(), "STAGE_NOT_RELEASED");
        assert!(err.to_string().contains("accountant"));
        assert!(err.to_string().contains("branch_manager"));
    }

    #[test]
    fn test_stage_already_decided_error() {
        let err = WorkflowError::StageAlreadyDecided {
            stage: Stage::Accountant,
            status: StageStatus::Released,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "STAGE_ALREADY_DECIDED");
    }

    #[test]
    fn test_form_locked_error() {
        let err = WorkflowError::FormLocked;
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "FORM_LOCKED");
    }

    #[test]
    fn test_form_not_found_error() {
        let err = WorkflowError::FormNotFound(Uuid::nil());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "FORM_NOT_FOUND");
    }

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = WorkflowError::StageNotReleased {
            required: Stage::BranchManager,
            attempted: Stage::Admin,
        }
        .into();
        assert_eq!(err.status_code(), 422);

        let err: AppError = WorkflowError::FormNotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);
    }
}
