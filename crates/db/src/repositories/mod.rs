//! Repository abstractions for data access.

pub mod branch;
pub mod document;
pub mod form;
pub mod template;
pub mod user;
pub mod workflow;

pub use branch::BranchRepository;
pub use document::DocumentRepository;
pub use form::FormRepository;
pub use template::TemplateRepository;
pub use user::UserRepository;
pub use workflow::WorkflowRepository;

use cashdesk_shared::AppError;
use sea_orm::DbErr;

/// Maps a database error into the application error type.
pub(crate) fn db_err(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}
