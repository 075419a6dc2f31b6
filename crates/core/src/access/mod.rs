//! Role-based permission checks.
//!
//! Visibility is a capability-set check: each role grants an explicit set
//! of operations, modeled as a permission table keyed by (role, operation)
//! rather than a role hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Branch staff: submits daily forms for assigned branches.
    User,
    /// First-stage reviewer for assigned branches.
    Accountant,
    /// Second-stage reviewer for assigned branches.
    BranchManager,
    /// Full access: final stage, administration, hard delete.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Accountant => "accountant",
            Self::BranchManager => "branch_manager",
            Self::Admin => "admin",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "accountant" => Some(Self::Accountant),
            "branch_manager" | "branchmanager" => Some(Self::BranchManager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns true if this role may perform the given operation.
    ///
    /// The explicit permission table. Admins are additionally exempt from
    /// branch scoping; for everyone else the branch check in the claims is
    /// applied on top of this table.
    #[must_use]
    pub const fn allows(&self, operation: Operation) -> bool {
        use Operation::{
            AccountantDecide, AccountantList, AdminDecide, AdminListAll, CreateForm,
            EditOwnForm, HardDeleteForm, ListOwnForms, ManageBranches, ManageTemplates,
            ManageUsers, ManagerDecide, ManagerList, MissingDaysReport, RegisterDocument,
        };

        match self {
            Self::User => matches!(
                operation,
                CreateForm | EditOwnForm | ListOwnForms | RegisterDocument
            ),
            Self::Accountant => matches!(
                operation,
                CreateForm
                    | EditOwnForm
                    | ListOwnForms
                    | RegisterDocument
                    | AccountantList
                    | AccountantDecide
                    | MissingDaysReport
            ),
            Self::BranchManager => matches!(
                operation,
                ListOwnForms | ManagerList | ManagerDecide | MissingDaysReport
            ),
            Self::Admin => matches!(
                operation,
                CreateForm
                    | EditOwnForm
                    | ListOwnForms
                    | RegisterDocument
                    | AccountantList
                    | AccountantDecide
                    | ManagerList
                    | ManagerDecide
                    | AdminListAll
                    | AdminDecide
                    | HardDeleteForm
                    | ManageBranches
                    | ManageTemplates
                    | ManageUsers
                    | MissingDaysReport
            ),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An operation gated by the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create a form for an assigned branch.
    CreateForm,
    /// Edit an own form while still editable.
    EditOwnForm,
    /// List own submitted forms.
    ListOwnForms,
    /// List forms awaiting accountant review.
    AccountantList,
    /// Release or reject the accountant stage.
    AccountantDecide,
    /// List forms awaiting branch-manager review.
    ManagerList,
    /// Release or reject the branch-manager stage.
    ManagerDecide,
    /// List all forms with derived status buckets.
    AdminListAll,
    /// Release or reject the admin stage.
    AdminDecide,
    /// Physically delete a form.
    HardDeleteForm,
    /// Create, rename, or delete branches.
    ManageBranches,
    /// Create, update, or deactivate report templates.
    ManageTemplates,
    /// Manage users and branch assignments.
    ManageUsers,
    /// Run the missing-days report.
    MissingDaysReport,
    /// Attach document metadata to a form.
    RegisterDocument,
}

impl Operation {
    /// Short description used in authorization error messages.
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::CreateForm => "create forms",
            Self::EditOwnForm => "edit forms",
            Self::ListOwnForms => "list own forms",
            Self::AccountantList => "list forms for accountant review",
            Self::AccountantDecide => "decide the accountant stage",
            Self::ManagerList => "list forms for manager review",
            Self::ManagerDecide => "decide the branch-manager stage",
            Self::AdminListAll => "list all forms",
            Self::AdminDecide => "decide the admin stage",
            Self::HardDeleteForm => "delete forms",
            Self::ManageBranches => "manage branches",
            Self::ManageTemplates => "manage templates",
            Self::ManageUsers => "manage users",
            Self::MissingDaysReport => "run the missing-days report",
            Self::RegisterDocument => "attach documents",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_role_round_trip() {
        for role in [
            Role::User,
            Role::Accountant,
            Role::BranchManager,
            Role::Admin,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("owner"), None);
    }

    #[rstest]
    #[case(Role::User, Operation::CreateForm, true)]
    #[case(Role::User, Operation::EditOwnForm, true)]
    #[case(Role::User, Operation::AccountantDecide, false)]
    #[case(Role::User, Operation::ManagerDecide, false)]
    #[case(Role::User, Operation::AdminDecide, false)]
    #[case(Role::User, Operation::ManageBranches, false)]
    #[case(Role::Accountant, Operation::AccountantDecide, true)]
    #[case(Role::Accountant, Operation::CreateForm, true)]
    #[case(Role::Accountant, Operation::MissingDaysReport, true)]
    #[case(Role::Accountant, Operation::ManagerDecide, false)]
    #[case(Role::Accountant, Operation::AdminDecide, false)]
    #[case(Role::Accountant, Operation::HardDeleteForm, false)]
    #[case(Role::BranchManager, Operation::ManagerDecide, true)]
    #[case(Role::BranchManager, Operation::ManagerList, true)]
    #[case(Role::BranchManager, Operation::AccountantDecide, false)]
    #[case(Role::BranchManager, Operation::CreateForm, false)]
    #[case(Role::BranchManager, Operation::AdminDecide, false)]
    #[case(Role::Admin, Operation::AdminDecide, true)]
    #[case(Role::Admin, Operation::AdminListAll, true)]
    #[case(Role::Admin, Operation::HardDeleteForm, true)]
    #[case(Role::Admin, Operation::ManageBranches, true)]
    #[case(Role::Admin, Operation::ManageTemplates, true)]
    #[case(Role::Admin, Operation::ManageUsers, true)]
    fn test_permission_table(
        #[case] role: Role,
        #[case] operation: Operation,
        #[case] allowed: bool,
    ) {
        assert_eq!(role.allows(operation), allowed);
    }
}
