//! Approval workflow routes: per-stage release and reject.
//!
//! Each stage has its own endpoint pair so the permission table, branch
//! scoping, and audit fields stay explicit per stage.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use cashdesk_core::access::{Operation, Role};
use cashdesk_core::workflow::{ReceiptOverrides, Stage};
use cashdesk_db::WorkflowRepository;

use crate::error::ApiError;
use crate::routes::forms::form_body;
use crate::{AppState, middleware::AuthUser};

/// Release/reject payload for the accountant and manager stages.
#[derive(Debug, Default, Deserialize)]
pub struct DecisionRequest {
    /// Stage note, also appended (tagged) to the shared notes.
    pub note: Option<String>,
}

/// Admin release payload with optional reconciliation overrides.
#[derive(Debug, Default, Deserialize)]
pub struct AdminReleaseRequest {
    /// Reconciliation note.
    pub admin_note: Option<String>,
    /// Confirmed cash amount; defaults to the submitted amount.
    pub received_cash: Option<Decimal>,
    /// Confirmed applications amount; defaults to the derived total.
    pub received_apps: Option<Decimal>,
    /// Confirmed bank amount; defaults to the derived total.
    pub received_bank: Option<Decimal>,
}

/// Creates the approvals router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/forms/{form_id}/accountant/release",
            post(accountant_release),
        )
        .route(
            "/forms/{form_id}/accountant/reject",
            post(accountant_reject),
        )
        .route("/forms/{form_id}/manager/release", post(manager_release))
        .route("/forms/{form_id}/manager/reject", post(manager_reject))
        .route("/forms/{form_id}/admin/release", post(admin_release))
        .route("/forms/{form_id}/admin/reject", post(admin_reject))
}

/// The caller's branch scope for workflow transitions: admins are
/// unscoped, everyone else is limited to assigned branches.
fn branch_scope(auth: &AuthUser, role: Role) -> Option<Vec<Uuid>> {
    if role == Role::Admin {
        None
    } else {
        Some(auth.branches().to_vec())
    }
}

async fn decide(
    state: &AppState,
    auth: &AuthUser,
    form_id: Uuid,
    stage: Stage,
    operation: Operation,
    release: bool,
    note: Option<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let role = auth.require(operation)?;
    let scope = branch_scope(auth, role);
    let repo = WorkflowRepository::new((*state.db).clone());

    let form = if release {
        repo.release(form_id, stage, auth.user_id(), scope.as_deref(), note)
            .await?
    } else {
        repo.reject(form_id, stage, auth.user_id(), scope.as_deref(), note)
            .await?
    };

    info!(
        form_id = %form.id,
        stage = %stage,
        released = release,
        decided_by = %auth.user_id(),
        status = %form.status,
        "Stage decided"
    );
    Ok(Json(form_body(&form)))
}

/// POST `/forms/{form_id}/accountant/release`
async fn accountant_release(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    decide(
        &state,
        &auth,
        form_id,
        Stage::Accountant,
        Operation::AccountantDecide,
        true,
        payload.note,
    )
    .await
}

/// POST `/forms/{form_id}/accountant/reject`
async fn accountant_reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    decide(
        &state,
        &auth,
        form_id,
        Stage::Accountant,
        Operation::AccountantDecide,
        false,
        payload.note,
    )
    .await
}

/// POST `/forms/{form_id}/manager/release`
async fn manager_release(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    decide(
        &state,
        &auth,
        form_id,
        Stage::BranchManager,
        Operation::ManagerDecide,
        true,
        payload.note,
    )
    .await
}

/// POST `/forms/{form_id}/manager/reject`
async fn manager_reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    decide(
        &state,
        &auth,
        form_id,
        Stage::BranchManager,
        Operation::ManagerDecide,
        false,
        payload.note,
    )
    .await
}

/// POST `/forms/{form_id}/admin/release`
///
/// Final release; captures the received amounts, defaulting each to the
/// form's submitted amount when no override is given.
async fn admin_release(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<AdminReleaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::AdminDecide)?;

    let form = WorkflowRepository::new((*state.db).clone())
        .release_admin(
            form_id,
            auth.user_id(),
            ReceiptOverrides {
                admin_note: payload.admin_note,
                received_cash: payload.received_cash,
                received_apps: payload.received_apps,
                received_bank: payload.received_bank,
            },
        )
        .await?;

    info!(
        form_id = %form.id,
        decided_by = %auth.user_id(),
        "Admin released with receipt"
    );
    Ok(Json(form_body(&form)))
}

/// POST `/forms/{form_id}/admin/reject`
async fn admin_reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    decide(
        &state,
        &auth,
        form_id,
        Stage::Admin,
        Operation::AdminDecide,
        false,
        payload.note,
    )
    .await
}
