//! Report computations over forms.

pub mod buckets;
pub mod missing_days;

pub use buckets::StatusBucket;
pub use missing_days::missing_days;
