//! Initial schema: users, branches, assignments, templates, forms, documents.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS documents, forms, report_templates, user_branches, branches, users CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Users (identities come from the external auth service)
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    role VARCHAR(32) NOT NULL DEFAULT 'user'
        CHECK (role IN ('user', 'accountant', 'branch_manager', 'admin')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Branches
CREATE TABLE branches (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Branch assignments controlling which forms a user may create or review
CREATE TABLE user_branches (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    branch_id UUID NOT NULL REFERENCES branches(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, branch_id)
);

-- Reusable line-item definitions
CREATE TABLE report_templates (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    item_group VARCHAR(16) NOT NULL CHECK (item_group IN ('applications', 'bank')),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Daily cash forms: approval sub-records flattened, line items embedded
CREATE TABLE forms (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id),
    branch_id UUID NOT NULL REFERENCES branches(id) ON DELETE CASCADE,
    form_date DATE NOT NULL,

    petty_cash NUMERIC(20, 6) NOT NULL DEFAULT 0,
    purchases NUMERIC(20, 6) NOT NULL DEFAULT 0,
    cash_collection NUMERIC(20, 6) NOT NULL DEFAULT 0,
    bank_mada NUMERIC(20, 6) NOT NULL DEFAULT 0,
    bank_visa NUMERIC(20, 6) NOT NULL DEFAULT 0,

    applications JSONB NOT NULL DEFAULT '[]',
    bank_collections JSONB NOT NULL DEFAULT '[]',

    apps_total NUMERIC(20, 6) NOT NULL DEFAULT 0,
    bank_total NUMERIC(20, 6) NOT NULL DEFAULT 0,
    total_sales NUMERIC(20, 6) NOT NULL DEFAULT 0,

    status VARCHAR(32) NOT NULL DEFAULT 'draft'
        CHECK (status IN ('draft', 'released', 'rejected', 'rejected_by_manager', 'resubmitted')),
    notes TEXT,

    accountant_status VARCHAR(16) NOT NULL DEFAULT 'pending'
        CHECK (accountant_status IN ('pending', 'released', 'rejected')),
    accountant_released_by UUID REFERENCES users(id),
    accountant_released_at TIMESTAMPTZ,
    accountant_note TEXT,

    manager_status VARCHAR(16) NOT NULL DEFAULT 'pending'
        CHECK (manager_status IN ('pending', 'released', 'rejected')),
    manager_released_by UUID REFERENCES users(id),
    manager_released_at TIMESTAMPTZ,
    manager_note TEXT,

    admin_status VARCHAR(16) NOT NULL DEFAULT 'pending'
        CHECK (admin_status IN ('pending', 'released', 'rejected')),
    admin_released_by UUID REFERENCES users(id),
    admin_released_at TIMESTAMPTZ,
    admin_release_note TEXT,

    admin_note TEXT,
    received_cash NUMERIC(20, 6),
    received_apps NUMERIC(20, 6),
    received_bank NUMERIC(20, 6),

    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Listing order: reporting date desc, creation time as tie-break
CREATE INDEX idx_forms_branch_date ON forms(branch_id, form_date DESC, created_at DESC);
CREATE INDEX idx_forms_user ON forms(user_id, form_date DESC);
CREATE INDEX idx_forms_accountant_status ON forms(accountant_status);
CREATE INDEX idx_forms_manager_status ON forms(manager_status);
CREATE INDEX idx_forms_admin_status ON forms(admin_status);

-- Attachment metadata; binary content lives in the external file store
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    form_id UUID NOT NULL REFERENCES forms(id) ON DELETE CASCADE,
    kind VARCHAR(16) NOT NULL CHECK (kind IN ('cash', 'bank', 'apps', 'purchase', 'petty')),
    file_name VARCHAR(512) NOT NULL,
    content_type VARCHAR(255),
    storage_key VARCHAR(512) NOT NULL,
    uploaded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_documents_form ON documents(form_id);
";
