//! Three-stage approval workflow for daily cash forms.
//!
//! Each form carries three independent per-stage sub-records, ordered
//! Accountant -> Branch Manager -> Admin. A later stage may only be decided
//! once every prior stage has been released.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::WorkflowError;
pub use service::{ReceiptOverrides, ReleaseService, SubmittedAmounts};
pub use types::{AdminReceipt, ApprovalState, FormStatus, Stage, StageDecision, StageStatus};
