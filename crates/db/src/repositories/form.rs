//! Form repository: creation, owner edits, listing, and reports.
//!
//! Every mutation path re-resolves line items and re-derives the totals
//! immediately before persistence, so a stale derived value is never
//! written or read back.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use cashdesk_core::form::{LineItem, LineItemDraft, LineItemGroup, resolve_line_items};
use cashdesk_core::report::{StatusBucket, missing_days};
use cashdesk_core::workflow::{ReleaseService, Stage, StageStatus, WorkflowError};
use cashdesk_shared::types::{PageRequest, PageResponse, TemplateId};
use cashdesk_shared::{AppError, AppResult};

use crate::entities::{branches, forms};
use crate::repositories::{TemplateRepository, db_err};

/// Input for creating a form.
#[derive(Debug, Clone)]
pub struct CreateFormInput {
    /// The branch the form reports for.
    pub branch_id: Uuid,
    /// The reporting day.
    pub form_date: NaiveDate,
    /// Petty cash on hand.
    pub petty_cash: Decimal,
    /// Purchases paid from the till.
    pub purchases: Decimal,
    /// Cash collected.
    pub cash_collection: Decimal,
    /// Legacy flat mada amount.
    pub bank_mada: Decimal,
    /// Legacy flat visa amount.
    pub bank_visa: Decimal,
    /// Application line-item drafts.
    pub applications: Vec<LineItemDraft>,
    /// Bank-collection line-item drafts.
    pub bank_collections: Vec<LineItemDraft>,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Input for an owner edit; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateFormInput {
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

/// Which forms a listing may see.
#[derive(Debug, Clone)]
pub enum FormScope {
    /// The caller's own submissions.
    Owner(Uuid),
    /// Forms of the caller's assigned branches (accountant/manager views).
    AssignedBranches(Vec<Uuid>),
    /// Every form (admin view).
    All,
}

/// Composable AND filters for form listings.
#[derive(Debug, Clone, Default)]
pub struct FormFilter {
    /// Restrict to one branch. Silently intersected with the scope's
    /// assigned-branch set.
    pub branch_id: Option<Uuid>,
    /// Inclusive lower bound on the reporting day.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the reporting day.
    pub date_to: Option<NaiveDate>,
    /// Case-insensitive substring match over the shared notes.
    pub notes_search: Option<String>,
    /// Equality on one stage's sub-status.
    pub stage_status: Option<(Stage, StageStatus)>,
    /// Derived status bucket (admin all-forms listing).
    pub bucket: Option<StatusBucket>,
}

/// Form repository for CRUD, listing, and report queries.
#[derive(Debug, Clone)]
pub struct FormRepository {
    db: DatabaseConnection,
}

impl FormRepository {
    /// Creates a new form repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a form by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<forms::Model>> {
        forms::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Creates a form in the pending-accountant state.
    ///
    /// Line items are resolved against the active templates (one batched
    /// lookup) and the totals derived before the insert.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the branch does not exist.
    pub async fn create(&self, user_id: Uuid, input: CreateFormInput) -> AppResult<forms::Model> {
        let branch_exists = branches::Entity::find_by_id(input.branch_id)
            .count(&self.db)
            .await
            .map_err(db_err)?
            > 0;
        if !branch_exists {
            return Err(AppError::NotFound(format!("branch {}", input.branch_id)));
        }

        let (applications, bank_collections) = self
            .resolve_items(&input.applications, &input.bank_collections)
            .await?;
        let totals =
            cashdesk_core::form::derive_totals(input.cash_collection, &applications, &bank_collections);

        let now = Utc::now().into();
        let pending = StageStatus::Pending.as_str().to_string();
        let form = forms::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            branch_id: Set(input.branch_id),
            form_date: Set(input.form_date),
            petty_cash: Set(input.petty_cash),
            purchases: Set(input.purchases),
            cash_collection: Set(input.cash_collection),
            bank_mada: Set(input.bank_mada),
            bank_visa: Set(input.bank_visa),
            applications: Set(items_to_json(&applications)?),
            bank_collections: Set(items_to_json(&bank_collections)?),
            apps_total: Set(totals.apps_total),
            bank_total: Set(totals.bank_total),
            total_sales: Set(totals.total_sales),
            status: Set(cashdesk_core::workflow::FormStatus::Draft.as_str().to_string()),
            notes: Set(input.notes),
            accountant_status: Set(pending.clone()),
            accountant_released_by: Set(None),
            accountant_released_at: Set(None),
            accountant_note: Set(None),
            manager_status: Set(pending.clone()),
            manager_released_by: Set(None),
            manager_released_at: Set(None),
            manager_note: Set(None),
            admin_status: Set(pending),
            admin_released_by: Set(None),
            admin_released_at: Set(None),
            admin_release_note: Set(None),
            admin_note: Set(None),
            received_cash: Set(None),
            received_apps: Set(None),
            received_bank: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        form.insert(&self.db).await.map_err(db_err)
    }

    /// Applies an owner edit, re-resolving line items and re-deriving the
    /// totals.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for a missing form, `Forbidden` when
    /// the caller is not the owner or the accountant has already released.
    pub async fn update(
        &self,
        form_id: Uuid,
        owner_id: Uuid,
        input: UpdateFormInput,
    ) -> AppResult<forms::Model> {
        let form = self
            .find_by_id(form_id)
            .await?
            .ok_or_else(|| WorkflowError::FormNotFound(form_id))?;

        if form.user_id != owner_id {
            return Err(AppError::Forbidden(
                "only the submitting user may edit this form".to_string(),
            ));
        }
        if !ReleaseService::can_owner_edit(&form.approval_state()) {
            return Err(WorkflowError::FormLocked.into());
        }

        let applications = match &input.applications {
            Some(drafts) => {
                let (apps, _) = self.resolve_items(drafts, &[]).await?;
                apps
            }
            None => form.application_items(),
        };
        let bank_collections = match &input.bank_collections {
            Some(drafts) => {
                let (_, bank) = self.resolve_items(&[], drafts).await?;
                bank
            }
            None => form.bank_collection_items(),
        };

        let cash_collection = input.cash_collection.unwrap_or(form.cash_collection);
        let totals =
            cashdesk_core::form::derive_totals(cash_collection, &applications, &bank_collections);

        let mut active: forms::ActiveModel = form.into();
        if let Some(form_date) = input.form_date {
            active.form_date = Set(form_date);
        }
        if let Some(petty_cash) = input.petty_cash {
            active.petty_cash = Set(petty_cash);
        }
        if let Some(purchases) = input.purchases {
            active.purchases = Set(purchases);
        }
        if let Some(bank_mada) = input.bank_mada {
            active.bank_mada = Set(bank_mada);
        }
        if let Some(bank_visa) = input.bank_visa {
            active.bank_visa = Set(bank_visa);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(Some(notes));
        }
        active.cash_collection = Set(cash_collection);
        active.applications = Set(items_to_json(&applications)?);
        active.bank_collections = Set(items_to_json(&bank_collections)?);
        active.apps_total = Set(totals.apps_total);
        active.bank_total = Set(totals.bank_total);
        active.total_sales = Set(totals.total_sales);
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)
    }

    /// Hard-deletes a form (admin only; documents cascade).
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the form does not exist.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = forms::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("form {id}")));
        }
        Ok(())
    }

    /// Lists forms within a scope, applying the composable filters.
    ///
    /// Sorted by reporting date descending with creation time as the
    /// tie-break. A branch filter outside the scope's assigned set yields
    /// an empty page rather than leaking other branches.
    pub async fn list(
        &self,
        scope: &FormScope,
        filter: &FormFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<forms::Model>> {
        let Some(condition) = build_condition(scope, filter) else {
            return Ok(PageResponse::new(vec![], page.page, page.per_page, 0));
        };

        let query = forms::Entity::find()
            .filter(condition)
            .order_by_desc(forms::Column::FormDate)
            .order_by_desc(forms::Column::CreatedAt);

        let paginator = query.paginate(&self.db, page.limit().max(1));
        let total = paginator.num_items().await.map_err(db_err)?;
        let data = paginator
            .fetch_page(u64::from(page.page.saturating_sub(1)))
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Computes the calendar days in `[from, to]` with no form for the
    /// branch.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an inverted date range.
    pub async fn missing_days(
        &self,
        branch_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<NaiveDate>> {
        if from > to {
            return Err(AppError::Validation(
                "date range start must not be after its end".to_string(),
            ));
        }

        let present: Vec<NaiveDate> = forms::Entity::find()
            .filter(forms::Column::BranchId.eq(branch_id))
            .filter(forms::Column::FormDate.gte(from))
            .filter(forms::Column::FormDate.lte(to))
            .select_only()
            .column(forms::Column::FormDate)
            .distinct()
            .into_tuple::<NaiveDate>()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(missing_days(from, to, &present.into_iter().collect()))
    }

    /// Resolves both draft lists against one batched template lookup.
    async fn resolve_items(
        &self,
        applications: &[LineItemDraft],
        bank_collections: &[LineItemDraft],
    ) -> AppResult<(Vec<LineItem>, Vec<LineItem>)> {
        let ids: Vec<TemplateId> = applications
            .iter()
            .chain(bank_collections)
            .filter_map(|d| d.template_id)
            .collect();

        let templates = TemplateRepository::new(self.db.clone())
            .find_active_by_ids(&ids)
            .await?;

        Ok((
            resolve_line_items(applications, &templates, LineItemGroup::Applications),
            resolve_line_items(bank_collections, &templates, LineItemGroup::Bank),
        ))
    }
}

/// Serializes line items into the embedded JSON column.
fn items_to_json(items: &[LineItem]) -> AppResult<serde_json::Value> {
    serde_json::to_value(items).map_err(|e| AppError::Internal(e.to_string()))
}

/// Intersects the caller's assigned branches with a requested branch
/// filter. `None` means the result is provably empty.
fn intersect_branch_filter(assigned: &[Uuid], requested: Option<Uuid>) -> Option<Vec<Uuid>> {
    match requested {
        Some(branch) if assigned.contains(&branch) => Some(vec![branch]),
        Some(_) => None,
        None => Some(assigned.to_vec()),
    }
}

/// Builds the SQL condition for a scoped, filtered listing.
///
/// Returns `None` when the combination is provably empty (branch filter
/// outside the assigned set, or an empty assigned set).
fn build_condition(scope: &FormScope, filter: &FormFilter) -> Option<Condition> {
    let mut condition = Condition::all();

    match scope {
        FormScope::Owner(user_id) => {
            condition = condition.add(forms::Column::UserId.eq(*user_id));
            if let Some(branch_id) = filter.branch_id {
                condition = condition.add(forms::Column::BranchId.eq(branch_id));
            }
        }
        FormScope::AssignedBranches(assigned) => {
            let branches = intersect_branch_filter(assigned, filter.branch_id)?;
            if branches.is_empty() {
                return None;
            }
            condition = condition.add(forms::Column::BranchId.is_in(branches));
        }
        FormScope::All => {
            if let Some(branch_id) = filter.branch_id {
                condition = condition.add(forms::Column::BranchId.eq(branch_id));
            }
        }
    }

    if let Some(from) = filter.date_from {
        condition = condition.add(forms::Column::FormDate.gte(from));
    }
    if let Some(to) = filter.date_to {
        condition = condition.add(forms::Column::FormDate.lte(to));
    }
    if let Some(search) = filter.notes_search.as_deref().map(str::trim)
        && !search.is_empty()
    {
        condition = condition
            .add(Expr::col((forms::Entity, forms::Column::Notes)).ilike(format!("%{search}%")));
    }
    if let Some((stage, status)) = filter.stage_status {
        let column = stage_column(stage);
        condition = condition.add(column.eq(status.as_str()));
    }
    if let Some(bucket) = filter.bucket {
        condition = condition.add(bucket_condition(bucket));
    }

    Some(condition)
}

/// Maps a stage to its status column.
const fn stage_column(stage: Stage) -> forms::Column {
    match stage {
        Stage::Accountant => forms::Column::AccountantStatus,
        Stage::BranchManager => forms::Column::ManagerStatus,
        Stage::Admin => forms::Column::AdminStatus,
    }
}

/// Translates a derived status bucket into raw sub-status conditions.
fn bucket_condition(bucket: StatusBucket) -> Condition {
    let pending = StageStatus::Pending.as_str();
    let released = StageStatus::Released.as_str();
    match bucket {
        StatusBucket::Pending => {
            Condition::all().add(forms::Column::AccountantStatus.eq(pending))
        }
        StatusBucket::WaitingBranch => Condition::all()
            .add(forms::Column::AccountantStatus.eq(released))
            .add(forms::Column::ManagerStatus.eq(pending)),
        StatusBucket::Released => Condition::all().add(forms::Column::AdminStatus.eq(released)),
        StatusBucket::Rejected => Condition::all().add(
            forms::Column::Status.is_in(["rejected", "rejected_by_manager"]),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersect_without_request_keeps_assigned_set() {
        let assigned = vec![Uuid::new_v4(), Uuid::new_v4()];
        assert_eq!(
            intersect_branch_filter(&assigned, None),
            Some(assigned.clone())
        );
    }

    #[test]
    fn test_intersect_with_assigned_branch_narrows() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(intersect_branch_filter(&[a, b], Some(b)), Some(vec![b]));
    }

    #[test]
    fn test_intersect_with_foreign_branch_is_empty() {
        let assigned = vec![Uuid::new_v4()];
        assert_eq!(intersect_branch_filter(&assigned, Some(Uuid::new_v4())), None);
    }

    #[test]
    fn test_foreign_branch_filter_yields_no_condition() {
        let scope = FormScope::AssignedBranches(vec![Uuid::new_v4()]);
        let filter = FormFilter {
            branch_id: Some(Uuid::new_v4()),
            ..FormFilter::default()
        };
        assert!(build_condition(&scope, &filter).is_none());
    }

    #[test]
    fn test_empty_assigned_set_yields_no_condition() {
        let scope = FormScope::AssignedBranches(vec![]);
        assert!(build_condition(&scope, &FormFilter::default()).is_none());
    }

    #[test]
    fn test_admin_scope_accepts_any_branch() {
        let filter = FormFilter {
            branch_id: Some(Uuid::new_v4()),
            bucket: Some(StatusBucket::WaitingBranch),
            ..FormFilter::default()
        };
        assert!(build_condition(&FormScope::All, &filter).is_some());
    }
}
