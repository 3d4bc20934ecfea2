/// Database plumbing
///
/// - `pool`: PostgreSQL pool creation and health check
/// - `migrations`: embedded schema migrations
///
/// Queries themselves live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
