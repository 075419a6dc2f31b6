//! Reporting routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use cashdesk_core::access::Operation;
use cashdesk_db::FormRepository;

use crate::error::ApiError;
use crate::{AppState, middleware::AuthUser};

/// Missing-days report parameters.
#[derive(Debug, Deserialize)]
pub struct MissingDaysQuery {
    /// The branch to audit.
    pub branch_id: Uuid,
    /// Inclusive range start.
    pub from: NaiveDate,
    /// Inclusive range end.
    pub to: NaiveDate,
}

/// Creates the reports router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/reports/missing-days", get(missing_days))
}

/// GET /reports/missing-days - Calendar days with no form for a branch.
///
/// Reviewer roles run this against their assigned branches; admins
/// against any branch.
async fn missing_days(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MissingDaysQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let role = auth.require(Operation::MissingDaysReport)?;
    auth.require_branch(role, query.branch_id)?;

    let missing = FormRepository::new((*state.db).clone())
        .missing_days(query.branch_id, query.from, query.to)
        .await?;

    Ok(Json(json!({
        "branch_id": query.branch_id,
        "from": query.from,
        "to": query.to,
        "missing": missing,
    })))
}
