//! Workflow repository: persists approval-stage decisions.
//!
//! The transition rules live in [`cashdesk_core::workflow::ReleaseService`];
//! this repository loads the approval snapshot, asks the service for a
//! decision, and writes the resulting columns in one update.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use cashdesk_core::workflow::{
    ReceiptOverrides, ReleaseService, Stage, StageDecision, SubmittedAmounts, WorkflowError,
};

use crate::entities::forms;

/// Workflow repository for stage release/reject transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Releases a stage on a form.
    ///
    /// `assigned_branches` is the caller's branch scope; `None` means
    /// unscoped (admin).
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::FormNotFound`, `BranchNotAssigned`, or the
    /// transition errors from the release service.
    pub async fn release(
        &self,
        form_id: Uuid,
        stage: Stage,
        decided_by: Uuid,
        assigned_branches: Option<&[Uuid]>,
        note: Option<String>,
    ) -> Result<forms::Model, WorkflowError> {
        let form = self.load_scoped(form_id, assigned_branches).await?;
        let decision = ReleaseService::release(stage, form.approval_state(), decided_by, note)?;
        self.apply(form, &decision).await
    }

    /// Rejects a stage on a form.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`WorkflowRepository::release`].
    pub async fn reject(
        &self,
        form_id: Uuid,
        stage: Stage,
        decided_by: Uuid,
        assigned_branches: Option<&[Uuid]>,
        note: Option<String>,
    ) -> Result<forms::Model, WorkflowError> {
        let form = self.load_scoped(form_id, assigned_branches).await?;
        let decision = ReleaseService::reject(stage, form.approval_state(), decided_by, note)?;
        self.apply(form, &decision).await
    }

    /// Releases the admin stage, capturing the reconciled amounts.
    ///
    /// Received amounts default to the form's own submitted amounts when no
    /// override is given.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`WorkflowRepository::release`].
    pub async fn release_admin(
        &self,
        form_id: Uuid,
        decided_by: Uuid,
        overrides: ReceiptOverrides,
    ) -> Result<forms::Model, WorkflowError> {
        let form = self.load_scoped(form_id, None).await?;
        let submitted = SubmittedAmounts {
            cash_collection: form.cash_collection,
            apps_total: form.apps_total,
            bank_total: form.bank_total,
        };
        let decision =
            ReleaseService::release_admin(form.approval_state(), decided_by, submitted, overrides)?;
        self.apply(form, &decision).await
    }

    async fn load_scoped(
        &self,
        form_id: Uuid,
        assigned_branches: Option<&[Uuid]>,
    ) -> Result<forms::Model, WorkflowError> {
        let form = forms::Entity::find_by_id(form_id)
            .one(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))?
            .ok_or(WorkflowError::FormNotFound(form_id))?;

        if let Some(assigned) = assigned_branches
            && !assigned.contains(&form.branch_id)
        {
            return Err(WorkflowError::BranchNotAssigned {
                branch_id: form.branch_id,
            });
        }

        Ok(form)
    }

    /// Writes one decision: stage columns, the overall-status cache, the
    /// tagged note append, and the receipt fields on admin release.
    async fn apply(
        &self,
        form: forms::Model,
        decision: &StageDecision,
    ) -> Result<forms::Model, WorkflowError> {
        let notes = append_note(form.notes.as_deref(), decision.tagged_note().as_deref());
        let status = decision.new_status.as_str().to_string();
        let released_by = Some(decision.decided_by);
        let released_at = Some(decision.decided_at.into());

        let mut active: forms::ActiveModel = form.into();
        match decision.stage {
            Stage::Accountant => {
                active.accountant_status = Set(status);
                active.accountant_released_by = Set(released_by);
                active.accountant_released_at = Set(released_at);
                active.accountant_note = Set(decision.note.clone());
            }
            Stage::BranchManager => {
                active.manager_status = Set(status);
                active.manager_released_by = Set(released_by);
                active.manager_released_at = Set(released_at);
                active.manager_note = Set(decision.note.clone());
            }
            Stage::Admin => {
                active.admin_status = Set(status);
                active.admin_released_by = Set(released_by);
                active.admin_released_at = Set(released_at);
                active.admin_release_note = Set(decision.note.clone());
            }
        }

        if let Some(receipt) = &decision.receipt {
            active.admin_note = Set(receipt.admin_note.clone());
            active.received_cash = Set(Some(receipt.received_cash));
            active.received_apps = Set(Some(receipt.received_apps));
            active.received_bank = Set(Some(receipt.received_bank));
        }

        active.status = Set(decision.overall.as_str().to_string());
        active.notes = Set(notes);
        active.updated_at = Set(Utc::now().into());

        active
            .update(&self.db)
            .await
            .map_err(|e| WorkflowError::Database(e.to_string()))
    }
}

/// Appends a stage-tagged note to the shared notes field.
fn append_note(existing: Option<&str>, tagged: Option<&str>) -> Option<String> {
    match (existing, tagged) {
        (Some(notes), Some(tagged)) if !notes.trim().is_empty() => {
            Some(format!("{notes}\n{tagged}"))
        }
        (_, Some(tagged)) => Some(tagged.to_string()),
        (Some(notes), None) => Some(notes.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("evening count"), Some("[ACC] verified"), Some("evening count\n[ACC] verified"))]
    #[case(None, Some("[BM] ok"), Some("[BM] ok"))]
    #[case(Some("  "), Some("[BM] ok"), Some("[BM] ok"))]
    #[case(Some("as submitted"), None, Some("as submitted"))]
    #[case(None, None, None)]
    fn test_append_note(
        #[case] existing: Option<&str>,
        #[case] tagged: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(append_note(existing, tagged).as_deref(), expected);
    }
}
