/// Database models
///
/// Each model owns its CRUD operations against the injected `PgPool`.
///
/// # Models
///
/// - `user`: User accounts and roles
/// - `task`: Tasks, due-date parsing, and the filtered listing queries
/// - `notification`: Append-only assignment notifications

pub mod notification;
pub mod task;
pub mod user;
