//! Release service: the approval state machine transitions.
//!
//! All methods are associated functions that validate a transition against
//! the current approval snapshot and return a [`StageDecision`] carrying the
//! audit trail. Failures are all-or-nothing: no decision, no state change.

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{
    AdminReceipt, ApprovalState, FormStatus, Stage, StageDecision, StageStatus,
};

/// The form's own submitted amounts, used as receipt defaults.
#[derive(Debug, Clone, Copy)]
pub struct SubmittedAmounts {
    /// Submitted cash collection.
    pub cash_collection: Decimal,
    /// Derived applications total.
    pub apps_total: Decimal,
    /// Derived bank total.
    pub bank_total: Decimal,
}

/// Optional admin overrides captured on final release.
#[derive(Debug, Clone, Default)]
pub struct ReceiptOverrides {
    /// Reconciliation note.
    pub admin_note: Option<String>,
    /// Override for the confirmed cash amount.
    pub received_cash: Option<Decimal>,
    /// Override for the confirmed applications amount.
    pub received_apps: Option<Decimal>,
    /// Override for the confirmed bank amount.
    pub received_bank: Option<Decimal>,
}

/// Stateless service for form approval transitions.
pub struct ReleaseService;

impl ReleaseService {
    /// Releases the given stage.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::StageNotReleased` if a prior stage is not
    /// released, or `WorkflowError::StageAlreadyDecided` if the stage was
    /// already released or rejected.
    pub fn release(
        stage: Stage,
        approvals: ApprovalState,
        decided_by: Uuid,
        note: Option<String>,
    ) -> Result<StageDecision, WorkflowError> {
        Self::decide(stage, approvals, decided_by, note, StageStatus::Released)
    }

    /// Rejects the given stage.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`ReleaseService::release`]: rejecting a later
    /// stage still requires every prior stage to be released.
    pub fn reject(
        stage: Stage,
        approvals: ApprovalState,
        decided_by: Uuid,
        note: Option<String>,
    ) -> Result<StageDecision, WorkflowError> {
        Self::decide(stage, approvals, decided_by, note, StageStatus::Rejected)
    }

    /// Releases the admin stage and captures the reconciled amounts.
    ///
    /// Received amounts default to the form's submitted amounts when the
    /// admin supplies no overrides. This is a capture, not a recompute.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`ReleaseService::release`].
    pub fn release_admin(
        approvals: ApprovalState,
        decided_by: Uuid,
        submitted: SubmittedAmounts,
        overrides: ReceiptOverrides,
    ) -> Result<StageDecision, WorkflowError> {
        let note = overrides.admin_note.clone();
        let mut decision = Self::decide(
            Stage::Admin,
            approvals,
            decided_by,
            note,
            StageStatus::Released,
        )?;

        decision.receipt = Some(AdminReceipt {
            admin_note: overrides.admin_note,
            received_cash: overrides.received_cash.unwrap_or(submitted.cash_collection),
            received_apps: overrides.received_apps.unwrap_or(submitted.apps_total),
            received_bank: overrides.received_bank.unwrap_or(submitted.bank_total),
        });

        Ok(decision)
    }

    /// Returns true if the owning user may still edit the form.
    ///
    /// Owner edits are allowed only until the accountant releases; after
    /// that, only stage transitions mutate the form.
    #[must_use]
    pub const fn can_owner_edit(approvals: &ApprovalState) -> bool {
        !matches!(approvals.accountant, StageStatus::Released)
    }

    /// Checks that every stage prior to `stage` has been released.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowError::StageNotReleased` naming the first missing
    /// prerequisite stage.
    pub const fn check_prior_stages(
        stage: Stage,
        approvals: &ApprovalState,
    ) -> Result<(), WorkflowError> {
        match stage {
            Stage::Accountant => Ok(()),
            Stage::BranchManager => {
                if matches!(approvals.accountant, StageStatus::Released) {
                    Ok(())
                } else {
                    Err(WorkflowError::StageNotReleased {
                        required: Stage::Accountant,
                        attempted: stage,
                    })
                }
            }
            Stage::Admin => {
                if !matches!(approvals.accountant, StageStatus::Released) {
                    Err(WorkflowError::StageNotReleased {
                        required: Stage::Accountant,
                        attempted: stage,
                    })
                } else if !matches!(approvals.branch_manager, StageStatus::Released) {
                    Err(WorkflowError::StageNotReleased {
                        required: Stage::BranchManager,
                        attempted: stage,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    fn decide(
        stage: Stage,
        approvals: ApprovalState,
        decided_by: Uuid,
        note: Option<String>,
        new_status: StageStatus,
    ) -> Result<StageDecision, WorkflowError> {
        Self::check_prior_stages(stage, &approvals)?;

        let current = approvals.stage(stage);
        if current != StageStatus::Pending {
            return Err(WorkflowError::StageAlreadyDecided {
                stage,
                status: current,
            });
        }

        let after = approvals.with(stage, new_status);
        Ok(StageDecision {
            stage,
            new_status,
            decided_by,
            decided_at: Utc::now(),
            note,
            overall: FormStatus::derive(&after),
            approvals: after,
            receipt: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn submitted() -> SubmittedAmounts {
        SubmittedAmounts {
            cash_collection: dec!(100),
            apps_total: dec!(50),
            bank_total: dec!(30),
        }
    }

    #[test]
    fn test_accountant_release_from_pending() {
        let decision = ReleaseService::release(
            Stage::Accountant,
            ApprovalState::new(),
            Uuid::new_v4(),
            None,
        )
        .unwrap();

        assert_eq!(decision.new_status, StageStatus::Released);
        assert_eq!(decision.overall, FormStatus::Released);
        assert_eq!(decision.approvals.accountant, StageStatus::Released);
        assert!(decision.approvals.is_consistent());
    }

    #[test]
    fn test_accountant_reject_sets_overall_rejected() {
        let decision = ReleaseService::reject(
            Stage::Accountant,
            ApprovalState::new(),
            Uuid::new_v4(),
            Some("missing receipts".to_string()),
        )
        .unwrap();

        assert_eq!(decision.overall, FormStatus::Rejected);
        assert_eq!(decision.tagged_note().unwrap(), "[ACC] missing receipts");
    }

    #[test]
    fn test_manager_before_accountant_is_rejected() {
        let result = ReleaseService::release(
            Stage::BranchManager,
            ApprovalState::new(),
            Uuid::new_v4(),
            None,
        );

        assert!(matches!(
            result,
            Err(WorkflowError::StageNotReleased {
                required: Stage::Accountant,
                attempted: Stage::BranchManager,
            })
        ));
    }

    #[test]
    fn test_manager_after_accountant_release() {
        let state = ApprovalState::new().with(Stage::Accountant, StageStatus::Released);
        let decision =
            ReleaseService::release(Stage::BranchManager, state, Uuid::new_v4(), None).unwrap();

        assert_eq!(decision.approvals.branch_manager, StageStatus::Released);
        assert_eq!(decision.overall, FormStatus::Released);
    }

    #[test]
    fn test_manager_reject_sets_rejected_by_manager() {
        let state = ApprovalState::new().with(Stage::Accountant, StageStatus::Released);
        let decision =
            ReleaseService::reject(Stage::BranchManager, state, Uuid::new_v4(), None).unwrap();

        assert_eq!(decision.overall, FormStatus::RejectedByManager);
    }

    #[test]
    fn test_admin_requires_both_prior_stages() {
        let only_accountant = ApprovalState::new().with(Stage::Accountant, StageStatus::Released);
        let result = ReleaseService::release_admin(
            only_accountant,
            Uuid::new_v4(),
            submitted(),
            ReceiptOverrides::default(),
        );

        assert!(matches!(
            result,
            Err(WorkflowError::StageNotReleased {
                required: Stage::BranchManager,
                attempted: Stage::Admin,
            })
        ));

        let neither = ApprovalState::new();
        let result = ReleaseService::release_admin(
            neither,
            Uuid::new_v4(),
            submitted(),
            ReceiptOverrides::default(),
        );
        assert!(matches!(
            result,
            Err(WorkflowError::StageNotReleased {
                required: Stage::Accountant,
                ..
            })
        ));
    }

    #[test]
    fn test_admin_release_defaults_received_amounts() {
        let state = ApprovalState::new()
            .with(Stage::Accountant, StageStatus::Released)
            .with(Stage::BranchManager, StageStatus::Released);

        let decision = ReleaseService::release_admin(
            state,
            Uuid::new_v4(),
            submitted(),
            ReceiptOverrides::default(),
        )
        .unwrap();

        let receipt = decision.receipt.unwrap();
        assert_eq!(receipt.received_cash, dec!(100));
        assert_eq!(receipt.received_apps, dec!(50));
        assert_eq!(receipt.received_bank, dec!(30));
        assert_eq!(decision.overall, FormStatus::Released);
    }

    #[test]
    fn test_admin_release_honors_overrides() {
        let state = ApprovalState::new()
            .with(Stage::Accountant, StageStatus::Released)
            .with(Stage::BranchManager, StageStatus::Released);

        let decision = ReleaseService::release_admin(
            state,
            Uuid::new_v4(),
            submitted(),
            ReceiptOverrides {
                admin_note: Some("short 5".to_string()),
                received_cash: Some(dec!(95)),
                received_apps: None,
                received_bank: None,
            },
        )
        .unwrap();

        let receipt = decision.receipt.as_ref().unwrap();
        assert_eq!(receipt.received_cash, dec!(95));
        assert_eq!(receipt.received_apps, dec!(50));
        assert_eq!(receipt.admin_note.as_deref(), Some("short 5"));
        assert_eq!(decision.tagged_note().unwrap(), "[ADMIN] short 5");
    }

    #[test]
    fn test_already_decided_stage_cannot_be_decided_again() {
        let state = ApprovalState::new().with(Stage::Accountant, StageStatus::Released);
        let result = ReleaseService::release(Stage::Accountant, state, Uuid::new_v4(), None);

        assert!(matches!(
            result,
            Err(WorkflowError::StageAlreadyDecided {
                stage: Stage::Accountant,
                status: StageStatus::Released,
            })
        ));

        let rejected = ApprovalState::new().with(Stage::Accountant, StageStatus::Rejected);
        let result = ReleaseService::release(Stage::Accountant, rejected, Uuid::new_v4(), None);
        assert!(matches!(
            result,
            Err(WorkflowError::StageAlreadyDecided { .. })
        ));
    }

    #[test]
    fn test_admin_reject_after_both_released() {
        let state = ApprovalState::new()
            .with(Stage::Accountant, StageStatus::Released)
            .with(Stage::BranchManager, StageStatus::Released);

        let decision = ReleaseService::reject(Stage::Admin, state, Uuid::new_v4(), None).unwrap();
        assert_eq!(decision.overall, FormStatus::Rejected);
        assert!(decision.approvals.is_consistent());
    }

    #[test]
    fn test_owner_edit_window() {
        assert!(ReleaseService::can_owner_edit(&ApprovalState::new()));

        let rejected = ApprovalState::new().with(Stage::Accountant, StageStatus::Rejected);
        assert!(ReleaseService::can_owner_edit(&rejected));

        let released = ApprovalState::new().with(Stage::Accountant, StageStatus::Released);
        assert!(!ReleaseService::can_owner_edit(&released));
    }
}
