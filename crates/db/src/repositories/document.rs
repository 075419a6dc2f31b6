//! Document repository: attachment metadata tied to forms.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use cashdesk_shared::{AppError, AppResult};

use crate::entities::{documents, forms};
use crate::repositories::db_err;

/// The accepted document kinds.
const DOCUMENT_KINDS: [&str; 5] = ["cash", "bank", "apps", "purchase", "petty"];

/// Input for registering a document against a form.
#[derive(Debug, Clone)]
pub struct RegisterDocumentInput {
    /// The form the document belongs to.
    pub form_id: Uuid,
    /// Document kind (cash, bank, apps, purchase, petty).
    pub kind: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// Key in the external file store.
    pub storage_key: String,
}

/// Document repository. Stores metadata only; binary content lives in the
/// external file store under `storage_key`.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a document against a form.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an unknown kind or empty file
    /// name, and `AppError::NotFound` if the form does not exist.
    pub async fn register(
        &self,
        uploaded_by: Uuid,
        input: RegisterDocumentInput,
    ) -> AppResult<documents::Model> {
        let kind = input.kind.trim().to_lowercase();
        if !DOCUMENT_KINDS.contains(&kind.as_str()) {
            return Err(AppError::Validation(format!(
                "unknown document kind '{kind}'"
            )));
        }

        let file_name = input.file_name.trim();
        if file_name.is_empty() {
            return Err(AppError::Validation("file name is required".to_string()));
        }

        let form_exists = forms::Entity::find_by_id(input.form_id)
            .count(&self.db)
            .await
            .map_err(db_err)?
            > 0;
        if !form_exists {
            return Err(AppError::NotFound(format!("form {}", input.form_id)));
        }

        let document = documents::ActiveModel {
            id: Set(Uuid::new_v4()),
            form_id: Set(input.form_id),
            kind: Set(kind),
            file_name: Set(file_name.to_string()),
            content_type: Set(input.content_type),
            storage_key: Set(input.storage_key),
            uploaded_by: Set(uploaded_by),
            created_at: Set(Utc::now().into()),
        };

        document.insert(&self.db).await.map_err(db_err)
    }

    /// Lists a form's documents, newest first.
    pub async fn list_by_form(&self, form_id: Uuid) -> AppResult<Vec<documents::Model>> {
        documents::Entity::find()
            .filter(documents::Column::FormId.eq(form_id))
            .order_by_desc(documents::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Deletes a document's metadata record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the document does not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = documents::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("document {id}")));
        }
        Ok(())
    }
}
