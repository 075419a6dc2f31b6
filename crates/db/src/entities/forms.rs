//! `SeaORM` Entity for the forms table.
//!
//! A form embeds its three approval sub-records (flattened to per-stage
//! columns) and its line-item collections (JSON columns) - no join tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use cashdesk_core::form::LineItem;
use cashdesk_core::workflow::{ApprovalState, StageStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "forms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub branch_id: Uuid,
    /// The reporting day, not the creation time.
    pub form_date: Date,

    pub petty_cash: Decimal,
    pub purchases: Decimal,
    pub cash_collection: Decimal,
    /// Legacy flat bank field; excluded from the bank_total recompute.
    pub bank_mada: Decimal,
    /// Legacy flat bank field; excluded from the bank_total recompute.
    pub bank_visa: Decimal,

    /// Ordered application line items, embedded as JSON.
    pub applications: Json,
    /// Ordered bank-collection line items, embedded as JSON.
    pub bank_collections: Json,

    /// Derived: sum of application amounts. Recomputed on every save.
    pub apps_total: Decimal,
    /// Derived: sum of bank-collection amounts. Recomputed on every save.
    pub bank_total: Decimal,
    /// Derived: cash_collection + apps_total + bank_total.
    pub total_sales: Decimal,

    /// Cache of the derived overall status, recomputed on every transition.
    pub status: String,
    /// Shared free-text notes with stage-prefixed appends.
    pub notes: Option<String>,

    pub accountant_status: String,
    pub accountant_released_by: Option<Uuid>,
    pub accountant_released_at: Option<DateTimeWithTimeZone>,
    pub accountant_note: Option<String>,

    pub manager_status: String,
    pub manager_released_by: Option<Uuid>,
    pub manager_released_at: Option<DateTimeWithTimeZone>,
    pub manager_note: Option<String>,

    pub admin_status: String,
    pub admin_released_by: Option<Uuid>,
    pub admin_released_at: Option<DateTimeWithTimeZone>,
    pub admin_release_note: Option<String>,

    /// Post-admin-release reconciliation fields.
    pub admin_note: Option<String>,
    pub received_cash: Option<Decimal>,
    pub received_apps: Option<Decimal>,
    pub received_bank: Option<Decimal>,

    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::branches::Entity",
        from = "Column::BranchId",
        to = "super::branches::Column::Id"
    )]
    Branches,
    #[sea_orm(has_many = "super::documents::Entity")]
    Documents,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds the core approval snapshot from the flattened stage columns.
    ///
    /// Unknown status strings degrade to pending rather than failing the
    /// read path.
    #[must_use]
    pub fn approval_state(&self) -> ApprovalState {
        ApprovalState {
            accountant: StageStatus::parse(&self.accountant_status)
                .unwrap_or(StageStatus::Pending),
            branch_manager: StageStatus::parse(&self.manager_status)
                .unwrap_or(StageStatus::Pending),
            admin: StageStatus::parse(&self.admin_status).unwrap_or(StageStatus::Pending),
        }
    }

    /// Deserializes the application line items.
    #[must_use]
    pub fn application_items(&self) -> Vec<LineItem> {
        serde_json::from_value(self.applications.clone()).unwrap_or_default()
    }

    /// Deserializes the bank-collection line items.
    #[must_use]
    pub fn bank_collection_items(&self) -> Vec<LineItem> {
        serde_json::from_value(self.bank_collections.clone()).unwrap_or_default()
    }
}
