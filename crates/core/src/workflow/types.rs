//! Workflow domain types for the form approval lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Status of a single approval stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    /// The stage has not been decided yet.
    Pending,
    /// The stage approved the form.
    Released,
    /// The stage rejected the form.
    Rejected,
}

impl StageStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Released => "released",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "released" => Some(Self::Released),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One of the three ordered approval stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// First stage: branch accountant review.
    Accountant,
    /// Second stage: branch manager review.
    BranchManager,
    /// Final stage: admin reconciliation and release.
    Admin,
}

impl Stage {
    /// Returns the string representation of the stage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accountant => "accountant",
            Self::BranchManager => "branch_manager",
            Self::Admin => "admin",
        }
    }

    /// Parses a stage from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "accountant" => Some(Self::Accountant),
            "branch_manager" | "manager" => Some(Self::BranchManager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Prefix tag used when appending a stage note to the shared notes field.
    #[must_use]
    pub const fn note_tag(&self) -> &'static str {
        match self {
            Self::Accountant => "[ACC]",
            Self::BranchManager => "[BM]",
            Self::Admin => "[ADMIN]",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse overall form status.
///
/// This is a pure derivation of the three stage sub-statuses (see
/// [`FormStatus::derive`]); the persisted column is a cache of that
/// derivation, recomputed on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    /// Awaiting the accountant's decision; still editable by the owner.
    Draft,
    /// Released by the accountant (and possibly later stages).
    Released,
    /// Rejected by the accountant or the admin.
    Rejected,
    /// Rejected by the branch manager.
    RejectedByManager,
    /// Legacy value carried for compatibility; no code path produces it.
    Resubmitted,
}

impl FormStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Released => "released",
            Self::Rejected => "rejected",
            Self::RejectedByManager => "rejected_by_manager",
            Self::Resubmitted => "resubmitted",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "released" => Some(Self::Released),
            "rejected" => Some(Self::Rejected),
            "rejected_by_manager" => Some(Self::RejectedByManager),
            "resubmitted" => Some(Self::Resubmitted),
            _ => None,
        }
    }

    /// Derives the overall status from the three stage sub-statuses.
    ///
    /// The single source of truth for the coarse status:
    /// - branch-manager rejection wins as `RejectedByManager`
    /// - any other rejection is `Rejected`
    /// - an accountant release (with no rejection) is `Released`
    /// - otherwise the form is still a `Draft`
    #[must_use]
    pub const fn derive(approvals: &ApprovalState) -> Self {
        if matches!(approvals.branch_manager, StageStatus::Rejected) {
            Self::RejectedByManager
        } else if matches!(approvals.accountant, StageStatus::Rejected)
            || matches!(approvals.admin, StageStatus::Rejected)
        {
            Self::Rejected
        } else if matches!(approvals.accountant, StageStatus::Released) {
            Self::Released
        } else {
            Self::Draft
        }
    }

    /// Returns true if the form was rejected at any stage.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected | Self::RejectedByManager)
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the three stage sub-statuses of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalState {
    /// Accountant stage status.
    pub accountant: StageStatus,
    /// Branch-manager stage status.
    pub branch_manager: StageStatus,
    /// Admin stage status.
    pub admin: StageStatus,
}

impl ApprovalState {
    /// The state of a freshly created form: every stage pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            accountant: StageStatus::Pending,
            branch_manager: StageStatus::Pending,
            admin: StageStatus::Pending,
        }
    }

    /// Returns the status of the given stage.
    #[must_use]
    pub const fn stage(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Accountant => self.accountant,
            Stage::BranchManager => self.branch_manager,
            Stage::Admin => self.admin,
        }
    }

    /// Returns a copy with the given stage set to `status`.
    #[must_use]
    pub const fn with(mut self, stage: Stage, status: StageStatus) -> Self {
        match stage {
            Stage::Accountant => self.accountant = status,
            Stage::BranchManager => self.branch_manager = status,
            Stage::Admin => self.admin = status,
        }
        self
    }

    /// Checks the stage ordering invariant: a later stage is never decided
    /// while a prior stage is not released.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        let manager_ok = matches!(self.branch_manager, StageStatus::Pending)
            || matches!(self.accountant, StageStatus::Released);
        let admin_ok = matches!(self.admin, StageStatus::Pending)
            || (matches!(self.accountant, StageStatus::Released)
                && matches!(self.branch_manager, StageStatus::Released));
        manager_ok && admin_ok
    }
}

impl Default for ApprovalState {
    fn default() -> Self {
        Self::new()
    }
}

/// The admin's reconciled amounts captured on final release.
///
/// A capture, not a recompute: values default to the form's submitted
/// amounts when the admin supplies no overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminReceipt {
    /// Free-text reconciliation note.
    pub admin_note: Option<String>,
    /// Confirmed cash amount.
    pub received_cash: Decimal,
    /// Confirmed applications amount.
    pub received_apps: Decimal,
    /// Confirmed bank amount.
    pub received_bank: Decimal,
}

/// A validated stage transition with its audit trail.
///
/// Produced by [`crate::workflow::ReleaseService`]; the persistence layer
/// applies it to the stored form in a single write.
#[derive(Debug, Clone)]
pub struct StageDecision {
    /// The stage that was decided.
    pub stage: Stage,
    /// The stage's new status (released or rejected).
    pub new_status: StageStatus,
    /// The acting user.
    pub decided_by: Uuid,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
    /// Optional note stored on the stage sub-record.
    pub note: Option<String>,
    /// The approval state after applying this decision.
    pub approvals: ApprovalState,
    /// The derived overall status after applying this decision.
    pub overall: FormStatus,
    /// Reconciled amounts, present only for admin releases.
    pub receipt: Option<AdminReceipt>,
}

impl StageDecision {
    /// The note with its stage prefix, for appending to the shared notes
    /// field. Both the tagged append and the sub-record note are kept.
    #[must_use]
    pub fn tagged_note(&self) -> Option<String> {
        self.note
            .as_deref()
            .map(|n| format!("{} {n}", self.stage.note_tag()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_round_trip() {
        for status in [
            StageStatus::Pending,
            StageStatus::Released,
            StageStatus::Rejected,
        ] {
            assert_eq!(StageStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(StageStatus::parse("invalid"), None);
    }

    #[test]
    fn test_stage_parse_accepts_manager_alias() {
        assert_eq!(Stage::parse("manager"), Some(Stage::BranchManager));
        assert_eq!(Stage::parse("branch_manager"), Some(Stage::BranchManager));
    }

    #[test]
    fn test_form_status_round_trip() {
        for status in [
            FormStatus::Draft,
            FormStatus::Released,
            FormStatus::Rejected,
            FormStatus::RejectedByManager,
            FormStatus::Resubmitted,
        ] {
            assert_eq!(FormStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_derive_fresh_form_is_draft() {
        assert_eq!(FormStatus::derive(&ApprovalState::new()), FormStatus::Draft);
    }

    #[test]
    fn test_derive_accountant_release() {
        let state = ApprovalState::new().with(Stage::Accountant, StageStatus::Released);
        assert_eq!(FormStatus::derive(&state), FormStatus::Released);
    }

    #[test]
    fn test_derive_accountant_rejection() {
        let state = ApprovalState::new().with(Stage::Accountant, StageStatus::Rejected);
        assert_eq!(FormStatus::derive(&state), FormStatus::Rejected);
    }

    #[test]
    fn test_derive_manager_rejection_wins() {
        let state = ApprovalState::new()
            .with(Stage::Accountant, StageStatus::Released)
            .with(Stage::BranchManager, StageStatus::Rejected);
        assert_eq!(FormStatus::derive(&state), FormStatus::RejectedByManager);
    }

    #[test]
    fn test_derive_admin_rejection() {
        let state = ApprovalState::new()
            .with(Stage::Accountant, StageStatus::Released)
            .with(Stage::BranchManager, StageStatus::Released)
            .with(Stage::Admin, StageStatus::Rejected);
        assert_eq!(FormStatus::derive(&state), FormStatus::Rejected);
    }

    #[test]
    fn test_is_consistent() {
        assert!(ApprovalState::new().is_consistent());

        let released = ApprovalState {
            accountant: StageStatus::Released,
            branch_manager: StageStatus::Released,
            admin: StageStatus::Released,
        };
        assert!(released.is_consistent());

        let manager_before_accountant = ApprovalState {
            accountant: StageStatus::Pending,
            branch_manager: StageStatus::Released,
            admin: StageStatus::Pending,
        };
        assert!(!manager_before_accountant.is_consistent());

        let admin_before_manager = ApprovalState {
            accountant: StageStatus::Released,
            branch_manager: StageStatus::Pending,
            admin: StageStatus::Rejected,
        };
        assert!(!admin_before_manager.is_consistent());
    }

    #[test]
    fn test_tagged_note() {
        let decision = StageDecision {
            stage: Stage::Accountant,
            new_status: StageStatus::Released,
            decided_by: Uuid::new_v4(),
            decided_at: Utc::now(),
            note: Some("counted twice".to_string()),
            approvals: ApprovalState::new().with(Stage::Accountant, StageStatus::Released),
            overall: FormStatus::Released,
            receipt: None,
        };
        assert_eq!(decision.tagged_note().unwrap(), "[ACC] counted twice");
    }
}
