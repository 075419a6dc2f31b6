//! Report-template management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use cashdesk_core::access::Operation;
use cashdesk_core::form::LineItemGroup;
use cashdesk_db::TemplateRepository;
use cashdesk_shared::AppError;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// Template listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateListQuery {
    /// Restrict to one group ("applications" or "bank").
    pub group: Option<String>,
    /// When true, return active templates only.
    #[serde(default)]
    pub only_active: bool,
}

/// Template create payload.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    /// Display name, snapshotted into forms at submission time.
    pub name: String,
    /// Group the template belongs to.
    pub group: String,
}

/// Template update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    /// New display name.
    pub name: Option<String>,
    /// Activate or deactivate the template.
    pub is_active: Option<bool>,
}

/// Creates the templates router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates))
        .route("/templates", post(create_template))
        .route("/templates/{template_id}", patch(update_template))
        .route("/templates/{template_id}", delete(delete_template))
}

fn parse_group(s: &str) -> Result<LineItemGroup, ApiError> {
    LineItemGroup::parse(s)
        .ok_or_else(|| AppError::Validation(format!("unknown template group '{s}'")).into())
}

/// GET /templates - List templates.
///
/// Clients use this to build submission forms, so any authenticated user
/// may read it.
async fn list_templates(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<TemplateListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let group = query.group.as_deref().map(parse_group).transpose()?;

    let templates = TemplateRepository::new((*state.db).clone())
        .list(group, query.only_active)
        .await?;

    Ok(Json(templates))
}

/// POST /templates - Create a template (admin only).
async fn create_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageTemplates)?;
    let group = parse_group(&payload.group)?;

    let template = TemplateRepository::new((*state.db).clone())
        .create(&payload.name, group)
        .await?;

    info!(template_id = %template.id, group = %template.group, "Template created");
    Ok((StatusCode::CREATED, Json(template)))
}

/// PATCH `/templates/{template_id}` - Update a template (admin only).
///
/// Deactivation stops the template resolving on new submissions;
/// historical forms keep their snapshotted names.
async fn update_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<Uuid>,
    Json(payload): Json<UpdateTemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageTemplates)?;

    let template = TemplateRepository::new((*state.db).clone())
        .update(template_id, payload.name.as_deref(), payload.is_active)
        .await?;

    Ok(Json(template))
}

/// DELETE `/templates/{template_id}` - Delete a template (admin only).
async fn delete_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(template_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageTemplates)?;

    TemplateRepository::new((*state.db).clone())
        .delete(template_id)
        .await?;

    info!(template_id = %template_id, "Template deleted");
    Ok(StatusCode::NO_CONTENT)
}
