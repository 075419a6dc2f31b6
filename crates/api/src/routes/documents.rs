//! Document metadata routes.
//!
//! Binary content lives in the external file store; these routes only
//! register and list the metadata tied to a form.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use cashdesk_core::access::{Operation, Role};
use cashdesk_core::workflow::WorkflowError;
use cashdesk_db::repositories::document::RegisterDocumentInput;
use cashdesk_db::{DocumentRepository, FormRepository};
use cashdesk_shared::AppError;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// Document registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterDocumentRequest {
    /// Document kind (cash, bank, apps, purchase, petty).
    pub kind: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// Key in the external file store.
    pub storage_key: String,
}

/// Creates the documents router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forms/{form_id}/documents", post(register_document))
        .route("/forms/{form_id}/documents", get(list_documents))
        .route("/documents/{document_id}", delete(delete_document))
}

/// Checks that the caller may touch the form's documents: the owner, a
/// reviewer assigned to the form's branch, or an admin.
async fn check_form_access(
    state: &AppState,
    auth: &AuthUser,
    form_id: Uuid,
) -> Result<(), ApiError> {
    let form = FormRepository::new((*state.db).clone())
        .find_by_id(form_id)
        .await?
        .ok_or(WorkflowError::FormNotFound(form_id))?;

    if form.user_id == auth.user_id() {
        return Ok(());
    }

    let role = Role::parse(auth.role())
        .ok_or_else(|| AppError::Forbidden("you may not access this form".to_string()))?;
    let allowed = role == Role::Admin
        || (role != Role::User && auth.claims().is_assigned_to(form.branch_id));
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden("you may not access this form".to_string()).into())
    }
}

/// POST `/forms/{form_id}/documents` - Register document metadata.
async fn register_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<RegisterDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::RegisterDocument)?;
    check_form_access(&state, &auth, form_id).await?;

    let document = DocumentRepository::new((*state.db).clone())
        .register(
            auth.user_id(),
            RegisterDocumentInput {
                form_id,
                kind: payload.kind,
                file_name: payload.file_name,
                content_type: payload.content_type,
                storage_key: payload.storage_key,
            },
        )
        .await?;

    info!(document_id = %document.id, form_id = %form_id, kind = %document.kind, "Document registered");
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET `/forms/{form_id}/documents` - List a form's documents.
async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    check_form_access(&state, &auth, form_id).await?;

    let documents = DocumentRepository::new((*state.db).clone())
        .list_by_form(form_id)
        .await?;

    Ok(Json(documents))
}

/// DELETE `/documents/{document_id}` - Remove document metadata (admin
/// only).
async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::HardDeleteForm)?;

    DocumentRepository::new((*state.db).clone())
        .delete(document_id)
        .await?;

    info!(document_id = %document_id, "Document deleted");
    Ok(StatusCode::NO_CONTENT)
}
