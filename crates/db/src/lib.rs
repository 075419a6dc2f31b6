//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Repositories fetch entities, convert them to core domain types, invoke
//! the pure services in `cashdesk-core`, and persist the result.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    BranchRepository, DocumentRepository, FormRepository, TemplateRepository, UserRepository,
    WorkflowRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};
use tracing::debug;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    debug!("connecting to database");
    Database::connect(database_url).await
}
