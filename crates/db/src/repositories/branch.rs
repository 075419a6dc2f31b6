//! Branch repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use cashdesk_shared::{AppError, AppResult};

use crate::entities::branches;
use crate::repositories::db_err;

/// Branch repository for CRUD operations.
///
/// Deleting a branch cascades to its forms and branch assignments via
/// the schema's foreign keys.
#[derive(Debug, Clone)]
pub struct BranchRepository {
    db: DatabaseConnection,
}

impl BranchRepository {
    /// Creates a new branch repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a branch by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<branches::Model>> {
        branches::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists all branches ordered by name.
    pub async fn list(&self) -> AppResult<Vec<branches::Model>> {
        branches::Entity::find()
            .order_by_asc(branches::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Creates a new branch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if a branch with the same name exists.
    pub async fn create(&self, name: &str) -> AppResult<branches::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("branch name is required".to_string()));
        }

        if self.name_exists(name).await? {
            return Err(AppError::Conflict(format!(
                "branch name '{name}' already exists"
            )));
        }

        let now = Utc::now().into();
        let branch = branches::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        branch.insert(&self.db).await.map_err(db_err)
    }

    /// Renames a branch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the branch does not exist and
    /// `AppError::Conflict` if the new name is taken.
    pub async fn rename(&self, id: Uuid, name: &str) -> AppResult<branches::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("branch name is required".to_string()));
        }

        let branch = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("branch {id}")))?;

        if branch.name != name && self.name_exists(name).await? {
            return Err(AppError::Conflict(format!(
                "branch name '{name}' already exists"
            )));
        }

        let mut active: branches::ActiveModel = branch.into();
        active.name = Set(name.to_string());
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Deletes a branch, cascading to its forms and assignments.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the branch does not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = branches::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("branch {id}")));
        }
        Ok(())
    }

    async fn name_exists(&self, name: &str) -> AppResult<bool> {
        let count = branches::Entity::find()
            .filter(branches::Column::Name.eq(name))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }
}
