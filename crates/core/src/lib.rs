//! Core business logic for Cashdesk.
//!
//! This crate holds the pure domain logic for the daily cash-collection
//! reporting workflow:
//! - Form line items and totals derivation
//! - The three-stage approval state machine
//! - Role-based permission checks
//! - Report computations (missing days, status buckets)
//!
//! It has zero web or database dependencies; persistence and transport
//! live in `cashdesk-db` and `cashdesk-api`.

pub mod access;
pub mod form;
pub mod report;
pub mod workflow;
