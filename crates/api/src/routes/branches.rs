//! Branch management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use cashdesk_core::access::Operation;
use cashdesk_db::BranchRepository;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// Branch create/rename payload.
#[derive(Debug, Deserialize)]
pub struct BranchRequest {
    /// Branch display name.
    pub name: String,
}

/// Creates the branches router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/branches", get(list_branches))
        .route("/branches", post(create_branch))
        .route("/branches/{branch_id}", patch(rename_branch))
        .route("/branches/{branch_id}", delete(delete_branch))
}

/// GET /branches - List all branches.
///
/// Any authenticated user may list branches; they are reference data for
/// form submission.
async fn list_branches(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let branches = BranchRepository::new((*state.db).clone()).list().await?;
    Ok(Json(branches))
}

/// POST /branches - Create a branch (admin only).
async fn create_branch(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BranchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageBranches)?;

    let branch = BranchRepository::new((*state.db).clone())
        .create(&payload.name)
        .await?;

    info!(branch_id = %branch.id, name = %branch.name, "Branch created");
    Ok((StatusCode::CREATED, Json(branch)))
}

/// PATCH `/branches/{branch_id}` - Rename a branch (admin only).
async fn rename_branch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(branch_id): Path<Uuid>,
    Json(payload): Json<BranchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageBranches)?;

    let branch = BranchRepository::new((*state.db).clone())
        .rename(branch_id, &payload.name)
        .await?;

    Ok(Json(branch))
}

/// DELETE `/branches/{branch_id}` - Delete a branch (admin only).
///
/// Cascades to the branch's forms and assignments.
async fn delete_branch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(branch_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageBranches)?;

    BranchRepository::new((*state.db).clone())
        .delete(branch_id)
        .await?;

    info!(branch_id = %branch_id, "Branch deleted");
    Ok(StatusCode::NO_CONTENT)
}
