//! Shared type definitions.

pub mod id;
pub mod pagination;

pub use id::TemplateId;
pub use pagination::{PageMeta, PageRequest, PageResponse};
