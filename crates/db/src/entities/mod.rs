//! `SeaORM` entity definitions.

pub mod branches;
pub mod documents;
pub mod forms;
pub mod report_templates;
pub mod user_branches;
pub mod users;
