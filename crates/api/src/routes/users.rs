//! User administration routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use cashdesk_core::access::Operation;
use cashdesk_db::UserRepository;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// User create payload.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Unique email address.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Role name (user, accountant, branch_manager, admin).
    pub role: String,
}

/// Branch-assignment replacement payload.
#[derive(Debug, Deserialize)]
pub struct AssignBranchesRequest {
    /// The complete new assigned-branch set.
    pub branch_ids: Vec<Uuid>,
}

/// Creates the users router. All routes are admin only.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/{user_id}/branches", get(list_assigned_branches))
        .route("/users/{user_id}/branches", put(assign_branches))
}

/// GET /users - List users.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageUsers)?;

    let users = UserRepository::new((*state.db).clone()).list().await?;
    Ok(Json(users))
}

/// POST /users - Create a user.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageUsers)?;

    let user = UserRepository::new((*state.db).clone())
        .create(&payload.email, &payload.full_name, &payload.role)
        .await?;

    info!(user_id = %user.id, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET `/users/{user_id}/branches` - List a user's assigned branch IDs.
async fn list_assigned_branches(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageUsers)?;

    let branch_ids = UserRepository::new((*state.db).clone())
        .assigned_branch_ids(user_id)
        .await?;

    Ok(Json(branch_ids))
}

/// PUT `/users/{user_id}/branches` - Replace a user's assigned-branch set.
///
/// Assignments take effect on the next issued token; outstanding tokens
/// keep their embedded branch list until they expire.
async fn assign_branches(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AssignBranchesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ManageUsers)?;

    UserRepository::new((*state.db).clone())
        .set_assigned_branches(user_id, &payload.branch_ids)
        .await?;

    info!(user_id = %user_id, count = payload.branch_ids.len(), "Branch assignments replaced");
    Ok(StatusCode::NO_CONTENT)
}
