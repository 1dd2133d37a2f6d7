/// Database layer
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: sqlx migration runner (migrations embedded from
///   `taskboard-shared/migrations/`)
///
/// Models live in the `models` module at the crate root.

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DatabaseConfig};
