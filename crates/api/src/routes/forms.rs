//! Daily cash form routes: submission, owner edits, and scoped listings.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use cashdesk_core::access::{Operation, Role};
use cashdesk_core::form::LineItemDraft;
use cashdesk_core::report::StatusBucket;
use cashdesk_core::workflow::{Stage, StageStatus, WorkflowError};
use cashdesk_db::entities::forms;
use cashdesk_db::repositories::form::{
    CreateFormInput, FormFilter, FormScope, UpdateFormInput,
};
use cashdesk_db::FormRepository;
use cashdesk_shared::AppError;
use cashdesk_shared::types::PageRequest;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// Form submission payload. Missing amounts default to zero.
#[derive(Debug, Deserialize)]
pub struct CreateFormRequest {
    /// The branch the form reports for.
    pub branch_id: Uuid,
    /// The reporting day.
    pub form_date: NaiveDate,
    /// Petty cash on hand.
    #[serde(default)]
    pub petty_cash: Decimal,
    /// Purchases paid from the till.
    #[serde(default)]
    pub purchases: Decimal,
    /// Cash collected.
    #[serde(default)]
    pub cash_collection: Decimal,
    /// Legacy flat mada amount.
    #[serde(default)]
    pub bank_mada: Decimal,
    /// Legacy flat visa amount.
    #[serde(default)]
    pub bank_visa: Decimal,
    /// Application line-item drafts.
    #[serde(default)]
    pub applications: Vec<LineItemDraft>,
    /// Bank-collection line-item drafts.
    #[serde(default)]
    pub bank_collections: Vec<LineItemDraft>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Owner edit payload; omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFormRequest {
    /// New reporting day.
    pub form_date: Option<NaiveDate>,
    /// New petty cash amount.
    pub petty_cash: Option<Decimal>,
    /// New purchases amount.
    pub purchases: Option<Decimal>,
    /// New cash collection amount.
    pub cash_collection: Option<Decimal>,
    /// New legacy mada amount.
    pub bank_mada: Option<Decimal>,
    /// New legacy visa amount.
    pub bank_visa: Option<Decimal>,
    /// Replacement application drafts.
    pub applications: Option<Vec<LineItemDraft>>,
    /// Replacement bank-collection drafts.
    pub bank_collections: Option<Vec<LineItemDraft>>,
    /// Replacement notes.
    pub notes: Option<String>,
}

/// Listing filters, shared across the scoped listing endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct FormListQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
    /// Restrict to one branch.
    pub branch_id: Option<Uuid>,
    /// Inclusive lower bound on the reporting day.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the reporting day.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring search over the notes.
    pub q: Option<String>,
    /// Stage name for the stage-status filter.
    pub stage: Option<String>,
    /// Stage status, paired with `stage`.
    pub stage_status: Option<String>,
    /// Derived status bucket (admin all-forms listing only).
    pub bucket: Option<String>,
}

/// Creates the forms router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/forms", post(create_form))
        .route("/forms", get(list_own_forms))
        .route("/forms/accountant", get(list_accountant_forms))
        .route("/forms/manager", get(list_manager_forms))
        .route("/forms/all", get(list_all_forms))
        .route("/forms/{form_id}", get(get_form))
        .route("/forms/{form_id}", patch(update_form))
        .route("/forms/{form_id}", delete(delete_form))
}

/// Renders a form with its approval sub-records nested.
pub(crate) fn form_body(form: &forms::Model) -> Value {
    json!({
        "id": form.id,
        "user_id": form.user_id,
        "branch_id": form.branch_id,
        "form_date": form.form_date,
        "petty_cash": form.petty_cash,
        "purchases": form.purchases,
        "cash_collection": form.cash_collection,
        "bank_mada": form.bank_mada,
        "bank_visa": form.bank_visa,
        "applications": form.applications,
        "bank_collections": form.bank_collections,
        "totals": {
            "apps_total": form.apps_total,
            "bank_total": form.bank_total,
            "total_sales": form.total_sales,
        },
        "status": form.status,
        "notes": form.notes,
        "approvals": {
            "accountant": {
                "status": form.accountant_status,
                "released_by": form.accountant_released_by,
                "released_at": form.accountant_released_at,
                "note": form.accountant_note,
            },
            "branch_manager": {
                "status": form.manager_status,
                "released_by": form.manager_released_by,
                "released_at": form.manager_released_at,
                "note": form.manager_note,
            },
            "admin": {
                "status": form.admin_status,
                "released_by": form.admin_released_by,
                "released_at": form.admin_released_at,
                "note": form.admin_release_note,
            },
        },
        "receipt": {
            "admin_note": form.admin_note,
            "received_cash": form.received_cash,
            "received_apps": form.received_apps,
            "received_bank": form.received_bank,
        },
        "created_at": form.created_at,
        "updated_at": form.updated_at,
    })
}

fn page_request(query: &FormListQuery) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest {
        page: query.page.unwrap_or(defaults.page).max(1),
        per_page: query.per_page.unwrap_or(defaults.per_page).clamp(1, 100),
    }
}

/// Translates query parameters into repository filters.
fn build_filter(query: &FormListQuery, allow_bucket: bool) -> Result<FormFilter, ApiError> {
    let stage_status = match (query.stage.as_deref(), query.stage_status.as_deref()) {
        (Some(stage), Some(status)) => {
            let stage = Stage::parse(stage)
                .ok_or_else(|| AppError::Validation(format!("unknown stage '{stage}'")))?;
            let status = StageStatus::parse(status).ok_or_else(|| {
                AppError::Validation(format!("unknown stage status '{status}'"))
            })?;
            Some((stage, status))
        }
        (None, None) => None,
        _ => {
            return Err(AppError::Validation(
                "stage and stage_status must be provided together".to_string(),
            )
            .into());
        }
    };

    let bucket = match query.bucket.as_deref() {
        Some(bucket) if allow_bucket => Some(StatusBucket::parse(bucket).ok_or_else(|| {
            AppError::Validation(format!("unknown status bucket '{bucket}'"))
        })?),
        Some(_) => {
            return Err(AppError::Validation(
                "bucket filtering is only available on the all-forms listing".to_string(),
            )
            .into());
        }
        None => None,
    };

    Ok(FormFilter {
        branch_id: query.branch_id,
        date_from: query.date_from,
        date_to: query.date_to,
        notes_search: query.q.clone(),
        stage_status,
        bucket,
    })
}

async fn list_scoped(
    state: &AppState,
    scope: FormScope,
    query: &FormListQuery,
    allow_bucket: bool,
) -> Result<Json<Value>, ApiError> {
    let filter = build_filter(query, allow_bucket)?;
    let page = page_request(query);

    let result = FormRepository::new((*state.db).clone())
        .list(&scope, &filter, &page)
        .await?;

    let data: Vec<Value> = result.data.iter().map(form_body).collect();
    Ok(Json(json!({ "data": data, "meta": result.meta })))
}

/// POST /forms - Submit a daily cash form.
///
/// Non-admins may only submit for branches they are assigned to.
async fn create_form(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateFormRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = auth.require(Operation::CreateForm)?;
    auth.require_branch(role, payload.branch_id)?;

    let form = FormRepository::new((*state.db).clone())
        .create(
            auth.user_id(),
            CreateFormInput {
                branch_id: payload.branch_id,
                form_date: payload.form_date,
                petty_cash: payload.petty_cash,
                purchases: payload.purchases,
                cash_collection: payload.cash_collection,
                bank_mada: payload.bank_mada,
                bank_visa: payload.bank_visa,
                applications: payload.applications,
                bank_collections: payload.bank_collections,
                notes: payload.notes,
            },
        )
        .await?;

    info!(
        form_id = %form.id,
        branch_id = %form.branch_id,
        form_date = %form.form_date,
        "Form submitted"
    );
    Ok((StatusCode::CREATED, Json(form_body(&form))))
}

/// GET /forms - List the caller's own submissions.
async fn list_own_forms(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FormListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::ListOwnForms)?;
    list_scoped(&state, FormScope::Owner(auth.user_id()), &query, false).await
}

/// GET /forms/accountant - List forms of assigned branches for review.
async fn list_accountant_forms(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FormListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let role = auth.require(Operation::AccountantList)?;
    let scope = if role == Role::Admin {
        FormScope::All
    } else {
        FormScope::AssignedBranches(auth.branches().to_vec())
    };
    list_scoped(&state, scope, &query, false).await
}

/// GET /forms/manager - List forms of assigned branches for the manager
/// stage.
async fn list_manager_forms(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FormListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let role = auth.require(Operation::ManagerList)?;
    let scope = if role == Role::Admin {
        FormScope::All
    } else {
        FormScope::AssignedBranches(auth.branches().to_vec())
    };
    list_scoped(&state, scope, &query, false).await
}

/// GET /forms/all - List every form with derived status buckets (admin
/// only).
async fn list_all_forms(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<FormListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::AdminListAll)?;
    list_scoped(&state, FormScope::All, &query, true).await
}

/// GET `/forms/{form_id}` - Fetch one form.
///
/// Visible to the owner, to reviewers assigned to the form's branch, and
/// to admins.
async fn get_form(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormRepository::new((*state.db).clone())
        .find_by_id(form_id)
        .await?
        .ok_or(WorkflowError::FormNotFound(form_id))?;

    if form.user_id != auth.user_id() {
        let role = Role::parse(auth.role()).ok_or_else(|| {
            AppError::Forbidden("you may not view this form".to_string())
        })?;
        let visible = match role {
            Role::Admin => true,
            Role::Accountant => {
                role.allows(Operation::AccountantList)
                    && auth.claims().is_assigned_to(form.branch_id)
            }
            Role::BranchManager => {
                role.allows(Operation::ManagerList)
                    && auth.claims().is_assigned_to(form.branch_id)
            }
            Role::User => false,
        };
        if !visible {
            return Err(AppError::Forbidden("you may not view this form".to_string()).into());
        }
    }

    Ok(Json(form_body(&form)))
}

/// PATCH `/forms/{form_id}` - Owner edit.
///
/// Allowed only until the accountant releases the form; line items are
/// re-resolved and the totals re-derived.
async fn update_form(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
    Json(payload): Json<UpdateFormRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::EditOwnForm)?;

    let form = FormRepository::new((*state.db).clone())
        .update(
            form_id,
            auth.user_id(),
            UpdateFormInput {
                form_date: payload.form_date,
                petty_cash: payload.petty_cash,
                purchases: payload.purchases,
                cash_collection: payload.cash_collection,
                bank_mada: payload.bank_mada,
                bank_visa: payload.bank_visa,
                applications: payload.applications,
                bank_collections: payload.bank_collections,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(form_body(&form)))
}

/// DELETE `/forms/{form_id}` - Hard delete (admin only).
async fn delete_form(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(form_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require(Operation::HardDeleteForm)?;

    FormRepository::new((*state.db).clone()).delete(form_id).await?;

    info!(form_id = %form_id, "Form deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_filter_requires_both_params() {
        let query = FormListQuery {
            stage: Some("accountant".to_string()),
            ..FormListQuery::default()
        };
        assert!(build_filter(&query, false).is_err());

        let query = FormListQuery {
            stage: Some("accountant".to_string()),
            stage_status: Some("pending".to_string()),
            ..FormListQuery::default()
        };
        let filter = build_filter(&query, false).unwrap();
        assert_eq!(
            filter.stage_status,
            Some((Stage::Accountant, StageStatus::Pending))
        );
    }

    #[test]
    fn test_bucket_only_allowed_on_all_listing() {
        let query = FormListQuery {
            bucket: Some("waiting_branch".to_string()),
            ..FormListQuery::default()
        };
        assert!(build_filter(&query, false).is_err());
        assert_eq!(
            build_filter(&query, true).unwrap().bucket,
            Some(StatusBucket::WaitingBranch)
        );
    }

    #[test]
    fn test_page_request_is_clamped() {
        let query = FormListQuery {
            page: Some(0),
            per_page: Some(1000),
            ..FormListQuery::default()
        };
        let page = page_request(&query);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 100);
    }
}
