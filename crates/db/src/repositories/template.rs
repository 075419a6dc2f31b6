//! Report-template repository for database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use cashdesk_core::form::{LineItemGroup, Template};
use cashdesk_shared::types::TemplateId;
use cashdesk_shared::{AppError, AppResult};

use crate::entities::report_templates;
use crate::repositories::db_err;

/// Report-template repository.
///
/// Templates feed line-item resolution at submission time only; their
/// names are snapshotted into forms, so updates and deactivations never
/// touch historical records.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    db: DatabaseConnection,
}

impl TemplateRepository {
    /// Creates a new template repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a template by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<report_templates::Model>> {
        report_templates::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists templates, optionally filtered by group and active flag.
    pub async fn list(
        &self,
        group: Option<LineItemGroup>,
        only_active: bool,
    ) -> AppResult<Vec<report_templates::Model>> {
        let mut query = report_templates::Entity::find();
        if let Some(group) = group {
            query = query.filter(report_templates::Column::Group.eq(group.as_str()));
        }
        if only_active {
            query = query.filter(report_templates::Column::IsActive.eq(true));
        }

        query
            .order_by_asc(report_templates::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Fetches the active templates matching the given IDs in one query.
    ///
    /// The single batched lookup backing line-item resolution; unknown or
    /// inactive IDs are simply absent from the result.
    pub async fn find_active_by_ids(&self, ids: &[TemplateId]) -> AppResult<Vec<Template>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let raw_ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        let models = report_templates::Entity::find()
            .filter(report_templates::Column::Id.is_in(raw_ids))
            .filter(report_templates::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.iter().filter_map(to_core_template).collect())
    }

    /// Creates a new template.
    pub async fn create(
        &self,
        name: &str,
        group: LineItemGroup,
    ) -> AppResult<report_templates::Model> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("template name is required".to_string()));
        }

        let now = Utc::now().into();
        let template = report_templates::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            group: Set(group.as_str().to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        template.insert(&self.db).await.map_err(db_err)
    }

    /// Updates a template's name and/or active flag.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the template does not exist.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> AppResult<report_templates::Model> {
        let template = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template {id}")))?;

        let mut active: report_templates::ActiveModel = template.into();
        if let Some(name) = name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::Validation("template name is required".to_string()));
            }
            active.name = Set(name.to_string());
        }
        if let Some(is_active) = is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)
    }

    /// Deletes a template. Historical forms keep their snapshotted names.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the template does not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = report_templates::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("template {id}")));
        }
        Ok(())
    }
}

/// Converts a template row to the core domain type.
///
/// Rows with an unknown group are skipped rather than failing the batch.
fn to_core_template(model: &report_templates::Model) -> Option<Template> {
    Some(Template {
        id: TemplateId::from_uuid(model.id),
        name: model.name.clone(),
        group: LineItemGroup::parse(&model.group)?,
        is_active: model.is_active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model(group: &str) -> report_templates::Model {
        report_templates::Model {
            id: Uuid::new_v4(),
            name: "HungerStation".to_string(),
            group: group.to_string(),
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_to_core_template() {
        let converted = to_core_template(&model("applications")).unwrap();
        assert_eq!(converted.group, LineItemGroup::Applications);
        assert_eq!(converted.name, "HungerStation");
        assert!(converted.is_active);
    }

    #[test]
    fn test_unknown_group_is_skipped() {
        assert!(to_core_template(&model("cash")).is_none());
    }
}
