//! Property-based tests for the release service.

use proptest::prelude::*;
use uuid::Uuid;

use crate::workflow::service::ReleaseService;
use crate::workflow::types::{ApprovalState, FormStatus, Stage, StageStatus};

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Accountant),
        Just(Stage::BranchManager),
        Just(Stage::Admin),
    ]
}

fn arb_action() -> impl Strategy<Value = (Stage, bool)> {
    (arb_stage(), any::<bool>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Starting from a fresh form, any sequence of release/reject attempts
    /// keeps the stage ordering invariant: successful decisions move to a
    /// consistent state, failed ones change nothing.
    #[test]
    fn prop_decisions_preserve_ordering_invariant(
        actions in proptest::collection::vec(arb_action(), 1..10)
    ) {
        let user = Uuid::new_v4();
        let mut state = ApprovalState::new();

        for (stage, approve) in actions {
            let result = if approve {
                ReleaseService::release(stage, state, user, None)
            } else {
                ReleaseService::reject(stage, state, user, None)
            };

            if let Ok(decision) = result {
                state = decision.approvals;
            }
            prop_assert!(state.is_consistent());
        }
    }

    /// The derived overall status always agrees with the sub-statuses.
    #[test]
    fn prop_overall_status_agrees_with_substates(
        actions in proptest::collection::vec(arb_action(), 1..10)
    ) {
        let user = Uuid::new_v4();
        let mut state = ApprovalState::new();

        for (stage, approve) in actions {
            let result = if approve {
                ReleaseService::release(stage, state, user, None)
            } else {
                ReleaseService::reject(stage, state, user, None)
            };

            if let Ok(decision) = result {
                state = decision.approvals;
                prop_assert_eq!(decision.overall, FormStatus::derive(&state));
            }
        }

        // A manager or admin decision is never recorded while the
        // accountant is still pending.
        if state.accountant == StageStatus::Pending {
            prop_assert_eq!(state.branch_manager, StageStatus::Pending);
            prop_assert_eq!(state.admin, StageStatus::Pending);
        }
    }
}
