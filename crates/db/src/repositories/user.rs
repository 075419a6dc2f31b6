//! User repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use cashdesk_core::access::Role;
use cashdesk_shared::{AppError, AppResult};

use crate::entities::{user_branches, users};
use crate::repositories::db_err;

/// User repository for CRUD and branch-assignment operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<users::Model>> {
        users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists all users ordered by email.
    pub async fn list(&self) -> AppResult<Vec<users::Model>> {
        users::Entity::find()
            .order_by_asc(users::Column::Email)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an unknown role and
    /// `AppError::Conflict` for a duplicate email.
    pub async fn create(&self, email: &str, full_name: &str, role: &str) -> AppResult<users::Model> {
        let role = Role::parse(role)
            .ok_or_else(|| AppError::Validation(format!("unknown role '{role}'")))?;

        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AppError::Validation("email is required".to_string()));
        }

        let exists = users::Entity::find()
            .filter(users::Column::Email.eq(&email))
            .count(&self.db)
            .await
            .map_err(db_err)?
            > 0;
        if exists {
            return Err(AppError::Conflict(format!("email '{email}' already exists")));
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            full_name: Set(full_name.trim().to_string()),
            role: Set(role.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        user.insert(&self.db).await.map_err(db_err)
    }

    /// Returns the IDs of the branches assigned to a user.
    pub async fn assigned_branch_ids(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        user_branches::Entity::find()
            .filter(user_branches::Column::UserId.eq(user_id))
            .select_only()
            .column(user_branches::Column::BranchId)
            .into_tuple::<Uuid>()
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Replaces a user's assigned-branch set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user does not exist.
    pub async fn set_assigned_branches(
        &self,
        user_id: Uuid,
        branch_ids: &[Uuid],
    ) -> AppResult<()> {
        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

        let txn = self.db.begin().await.map_err(db_err)?;

        user_branches::Entity::delete_many()
            .filter(user_branches::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let now = Utc::now().into();
        for branch_id in branch_ids {
            let assignment = user_branches::ActiveModel {
                user_id: Set(user_id),
                branch_id: Set(*branch_id),
                created_at: Set(now),
            };
            assignment.insert(&txn).await.map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)
    }
}
